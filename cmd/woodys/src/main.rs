//! # Woodys Binary
//!
//! The entry point that assembles the server from its adapters.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use api_adapters::{AppState, RateLimiter};
use auth_adapters::ExternalUidIdentityProvider;
use configs::{LogSettings, Settings};
use secrecy::ExposeSecret;
use services::Services;
use storage_adapters::SqlitePoolHealth;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    init_tracing(&settings.log);

    // 1. Store
    let pool = storage_adapters::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await
    .context("failed to open database")?;
    let repos = storage_adapters::repositories(pool.clone());

    // 2. Services, identity and HTTP state
    let state = AppState::new(
        Services::new(&repos),
        Arc::new(ExternalUidIdentityProvider::new(repos.users.clone())),
        Arc::new(SqlitePoolHealth::new(pool.clone())),
        RateLimiter::new(settings.rate_limit.requests, settings.rate_limit.window()),
    );

    // 3. Serve
    let addr = settings.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "woodys listening");

    axum::serve(
        listener,
        api_adapters::router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    pool.close().await;
    info!("shut down cleanly");
    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
