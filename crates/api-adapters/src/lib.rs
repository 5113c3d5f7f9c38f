//! # api-adapters
//!
//! The HTTP surface of the Woodys backend. Handlers translate requests into
//! service calls and map [`domains::AppError`] onto status codes; they hold no
//! business rules of their own.
//!
//! Every route lives under `/api/v1` except `/health` and `/metrics`.

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod metrics;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod rate_limit;
#[cfg(feature = "web-axum")]
pub mod routes;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(all(test, feature = "web-axum"))]
pub(crate) mod test_support;

#[cfg(feature = "web-axum")]
pub use error::{ApiError, ApiResult};
#[cfg(feature = "web-axum")]
pub use metrics::Metrics;
#[cfg(feature = "web-axum")]
pub use rate_limit::RateLimiter;
#[cfg(feature = "web-axum")]
pub use routes::router;
#[cfg(feature = "web-axum")]
pub use state::AppState;
