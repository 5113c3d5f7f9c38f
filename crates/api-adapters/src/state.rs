//! Application state shared across all handlers.

use std::sync::Arc;

use domains::{HealthCheck, IdentityProvider};
use services::Services;

use crate::{metrics::Metrics, rate_limit::RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub identity: Arc<dyn IdentityProvider>,
    pub health: Arc<dyn HealthCheck>,
    pub rate_limiter: Arc<RateLimiter>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        services: Services,
        identity: Arc<dyn IdentityProvider>,
        health: Arc<dyn HealthCheck>,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            services,
            identity,
            health,
            rate_limiter: Arc::new(rate_limiter),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
