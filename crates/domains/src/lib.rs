//! woodys/crates/domains/src/lib.rs
//!
//! The central domain logic and interface definitions for the Woodys backend:
//! entities, validation, authorization predicates, rating aggregation and the
//! ports that storage and identity adapters implement.

pub mod aggregation;
pub mod error;
pub mod models;
pub mod pagination;
pub mod ports;
pub mod validation;

// Re-exporting for easier access in other crates
pub use aggregation::*;
pub use error::*;
pub use models::*;
pub use pagination::Pagination;
pub use ports::*;
pub use validation::Validate;
