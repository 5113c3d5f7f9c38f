//! # auth-adapters
//!
//! Resolves the caller behind a request. Callers present the opaque token
//! issued by the external identity provider; it is looked up against the
//! `firebase_uid` stored on each user. Signature verification happens
//! upstream and is not repeated here.

use std::sync::Arc;

use async_trait::async_trait;
use domains::{IdentityProvider, OptionalExt, Result, UserId, UserRepository};
use tracing::debug;

/// Extracts the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; blank tokens are rejected.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// [`IdentityProvider`] backed by the user store.
pub struct ExternalUidIdentityProvider {
    users: Arc<dyn UserRepository>,
}

impl ExternalUidIdentityProvider {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl IdentityProvider for ExternalUidIdentityProvider {
    async fn resolve(&self, token: &str) -> Result<Option<UserId>> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        let user = self.users.get_by_firebase_uid(token).await.optional()?;
        if user.is_none() {
            debug!("token does not belong to any user");
        }
        Ok(user.map(|u| u.id))
    }
}
