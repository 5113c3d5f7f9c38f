use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Normalized `limit`/`offset` window for list operations.
///
/// A missing or zero limit becomes [`Pagination::DEFAULT_LIMIT`]; anything
/// above [`Pagination::MAX_LIMIT`] is clamped. Negative values are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    limit: i64,
    offset: i64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self, ValidationError> {
        let limit = limit.unwrap_or(0);
        let offset = offset.unwrap_or(0);
        if limit < 0 {
            return Err(ValidationError::new("limit", "limit cannot be negative"));
        }
        if offset < 0 {
            return Err(ValidationError::new("offset", "offset cannot be negative"));
        }
        let limit = match limit {
            0 => Self::DEFAULT_LIMIT,
            l => l.min(Self::MAX_LIMIT),
        };
        Ok(Self { limit, offset })
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}
