use domains::AppError;
use tracing::error;

/// Translates `sqlx` failures into the domain taxonomy.
///
/// A missing row is `NotFound`, a unique violation is `Conflict`, and a
/// foreign-key violation means a referenced entity is missing. Anything else
/// is an infrastructure failure.
pub(crate) fn map_sqlx_error(err: sqlx::Error, entity: &str) -> AppError {
    match &err {
        sqlx::Error::RowNotFound => AppError::NotFound(format!("{entity} not found")),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("{entity} already exists"))
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::NotFound(format!("entity referenced by {entity} not found"))
        }
        _ => {
            error!(entity, error = %err, "database error");
            AppError::Internal(err.to_string())
        }
    }
}

pub(crate) trait StoreResultExt<T> {
    fn store_err(self, entity: &str) -> Result<T, AppError>;
}

impl<T> StoreResultExt<T> for Result<T, sqlx::Error> {
    fn store_err(self, entity: &str) -> Result<T, AppError> {
        self.map_err(|e| map_sqlx_error(e, entity))
    }
}
