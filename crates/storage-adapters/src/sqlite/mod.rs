//! # SQLite store
//!
//! Maps the relational model onto the `domains` entities with runtime
//! `sqlx` queries. Foreign keys are enforced on every connection; the
//! schema lives in `migrations/` and is embedded into the binary.

mod comments;
mod error;
mod project_lists;
mod projects;
mod ratings;
mod users;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domains::{HealthCheck, Repositories, Result};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::info;

pub use comments::SqliteCommentRepository;
pub use project_lists::SqliteProjectListRepository;
pub use projects::SqliteProjectRepository;
pub use ratings::SqliteRatingRepository;
pub use users::SqliteUserRepository;

pub(crate) use error::StoreResultExt;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Failures while opening or preparing the store. Request-time failures are
/// reported as `AppError` instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid database url: {0}")]
    Url(#[source] sqlx::Error),

    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Opens a pool and brings the schema up to date.
///
/// In-memory databases live inside a single connection, so the pool is pinned
/// to one connection that never expires.
pub async fn connect(url: &str, max_connections: u32) -> std::result::Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(StoreError::Url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let in_memory = url.contains(":memory:");
    let mut pool_options = SqlitePoolOptions::new();
    pool_options = if in_memory {
        pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options.max_connections(max_connections.max(1))
    };

    let pool = pool_options
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
        .map_err(StoreError::Connect)?;

    MIGRATOR.run(&pool).await?;
    info!(in_memory, "database ready");
    Ok(pool)
}

/// One repository per port, all sharing `pool`.
pub fn repositories(pool: SqlitePool) -> Repositories {
    Repositories {
        users: Arc::new(SqliteUserRepository::new(pool.clone())),
        projects: Arc::new(SqliteProjectRepository::new(pool.clone())),
        comments: Arc::new(SqliteCommentRepository::new(pool.clone())),
        ratings: Arc::new(SqliteRatingRepository::new(pool.clone())),
        project_lists: Arc::new(SqliteProjectListRepository::new(pool)),
    }
}

#[async_trait]
impl HealthCheck for SqlitePoolHealth {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .store_err("database")?;
        Ok(())
    }
}

/// [`HealthCheck`] backed by a trivial query on the pool.
#[derive(Clone)]
pub struct SqlitePoolHealth {
    pool: SqlitePool,
}

impl SqlitePoolHealth {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Decodes a JSON text column holding a string collection.
pub(crate) fn decode_json<T>(raw: &str) -> std::result::Result<T, sqlx::Error>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub(crate) fn encode_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| domains::AppError::Internal(e.to_string()))
}
