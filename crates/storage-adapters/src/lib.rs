//! # storage-adapters
//!
//! Store implementations of the repository ports declared in `domains`.
//! Each backend sits behind a cargo feature; `db-sqlite` is the default.

#[cfg(feature = "db-sqlite")]
pub mod sqlite;

#[cfg(feature = "db-sqlite")]
pub use sqlite::{
    connect, repositories, SqliteCommentRepository, SqliteProjectListRepository,
    SqlitePoolHealth, SqliteProjectRepository, SqliteRatingRepository, SqliteUserRepository, StoreError,
};

#[cfg(feature = "db-sqlite")]
pub use sqlx::sqlite::SqlitePool;
