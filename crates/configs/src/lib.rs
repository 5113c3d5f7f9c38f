//! # configs
//!
//! Layered settings for the Woodys server. Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `config/default.toml`
//! 3. `config/local.toml` (not checked in)
//! 4. `WOODYS__`-prefixed environment variables, `__` between path segments
//!    (`WOODYS__DATABASE__URL`, `WOODYS__RATE_LIMIT__REQUESTS`, ...)
//!
//! A `.env` file, if present, is loaded into the environment first.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub rate_limit: RateLimitSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid {
                key: "server.host",
                message: format!("{e}"),
            })
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// May embed credentials for other backends; never logged.
    #[serde(deserialize_with = "secret_string")]
    pub url: SecretString,
    pub max_connections: u32,
}

/// Per-caller sliding window.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitSettings {
    pub requests: u32,
    pub window_secs: u64,
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    pub json: bool,
}

fn secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl Settings {
    /// Loads `.env`, then layers files under `./config` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::load_from(Path::new("config"))
    }

    /// Same as [`Settings::load`] without `.env`, reading files from `dir`.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite://woodys.db")?
            .set_default("database.max_connections", 5)?
            .set_default("rate_limit.requests", 100)?
            .set_default("rate_limit.window_secs", 60)?
            .set_default("log.level", "info")?
            .set_default("log.json", false)?
            .add_source(File::from(dir.join("default.toml")).required(false))
            .add_source(File::from(dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("WOODYS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                key: "server.port",
                message: "must be greater than 0".into(),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "database.max_connections",
                message: "must be greater than 0".into(),
            });
        }
        if self.rate_limit.requests == 0 {
            return Err(ConfigError::Invalid {
                key: "rate_limit.requests",
                message: "must be greater than 0".into(),
            });
        }
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "rate_limit.window_secs",
                message: "must be greater than 0".into(),
            });
        }
        Ok(())
    }
}
