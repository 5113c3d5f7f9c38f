//! Route handlers, one module per resource.

pub mod comments;
pub mod health;
pub mod project_lists;
pub mod projects;
pub mod ratings;
pub mod users;

use domains::{Pagination, ValidationError};
use serde::Deserialize;

/// `?limit=&offset=`; out-of-range values are rejected, absent ones defaulted.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    pub fn pagination(&self) -> Result<Pagination, ValidationError> {
        Pagination::new(self.limit, self.offset)
    }
}
