//! Middleware for security, logging and traffic control.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use tracing::{debug, warn};

use crate::{error::ApiError, state::AppState};

/// Counts every response, including the ones short-circuited by inner layers.
pub async fn track_metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let response = next.run(req).await;
    state
        .metrics
        .record_request(method.as_str(), response.status().as_u16());
    response
}

/// Keys callers by resolved user, else by peer address. Unverified tokens
/// never pick the bucket.
pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = caller_key(&state, &req).await;
    if !state.rate_limiter.check(&key) {
        warn!(caller = %key, "rate limit exceeded");
        state.metrics.record_rate_limited();
        return ApiError::RateLimited.into_response();
    }
    next.run(req).await
}

// Reads the request up front so the returned future doesn't borrow the
// (non-`Sync`) request body across the await and stays `Send`.
fn caller_key<'a>(
    state: &'a AppState,
    req: &Request,
) -> impl std::future::Future<Output = String> + Send + 'a {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(auth_adapters::parse_bearer)
        .map(str::to_owned);
    let peer = req.extensions().get::<ConnectInfo<SocketAddr>>().map(|c| c.0);
    async move {
        if let Some(token) = token {
            match state.identity.resolve(&token).await {
                Ok(Some(user)) => return format!("user:{user}"),
                Ok(None) => {}
                Err(e) => debug!(error = %e, "identity lookup failed, keying by address"),
            }
        }
        match peer {
            Some(addr) => format!("ip:{}", addr.ip()),
            None => "ip:unknown".to_owned(),
        }
    }
}

pub fn cors_policy() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// `X-Content-Type-Options`, `X-Frame-Options` and `Referrer-Policy`.
pub fn security_headers() -> impl Iterator<Item = SetResponseHeaderLayer<HeaderValue>> {
    [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "DENY"),
        (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
    ]
    .into_iter()
    .map(|(name, value): (HeaderName, &'static str)| {
        SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
    })
}
