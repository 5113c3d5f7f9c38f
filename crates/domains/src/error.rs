//! # AppError
//!
//! Centralized error handling for the Woodys backend.
//! Every failure that leaves a service maps to exactly one [`ErrorKind`].

use std::fmt::Display;

use thiserror::Error;

/// A single field-level validation failure.
///
/// Never wraps a lower-level error: the field name and message are the whole story.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The primary error type for all domain, service and repository operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or out-of-range input
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Referenced entity does not resolve (e.g., User, Project, Comment)
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation (duplicate rating, duplicate list membership, duplicate email)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller fails an ownership or access predicate
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Infrastructure failure (e.g., DB down, pool exhausted)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// The five user-visible failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Unauthorized,
    Internal,
}

impl ErrorKind {
    /// Conventional REST status code for this kind.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Unauthorized => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Internal => "internal_error",
        }
    }
}

impl AppError {
    /// `"<entity> with id <id> not found"`
    pub fn not_found(entity: &str, id: impl Display) -> Self {
        AppError::NotFound(format!("{entity} with id {id} not found"))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Prefixes the message with operation context, keeping the kind.
    /// Validation failures are returned untouched so field + message survive.
    pub fn context(self, ctx: impl Display) -> Self {
        match self {
            AppError::Validation(v) => AppError::Validation(v),
            AppError::NotFound(m) => AppError::NotFound(format!("{ctx}: {m}")),
            AppError::Conflict(m) => AppError::Conflict(format!("{ctx}: {m}")),
            AppError::Unauthorized(m) => AppError::Unauthorized(format!("{ctx}: {m}")),
            AppError::Internal(m) => AppError::Internal(format!("{ctx}: {m}")),
        }
    }
}

/// A specialized Result type for Woodys logic.
pub type Result<T> = std::result::Result<T, AppError>;

/// Adds operation context to a failed result.
pub trait ResultExt<T> {
    fn context(self, ctx: impl Display) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, ctx: impl Display) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

/// Turns a `NotFound` into `Ok(None)` for existence checks.
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for Result<T> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
