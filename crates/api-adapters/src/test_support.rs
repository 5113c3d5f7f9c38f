//! Router fixtures backed by mock repositories.

use std::sync::Arc;
use std::time::Duration;

use axum::{body::to_bytes, response::Response};
use chrono::Utc;
use domains::*;
use serde_json::Value;
use services::Services;

use crate::{rate_limit::RateLimiter, state::AppState};

/// Mocks left unconfigured panic on any call, which flags unexpected store access.
#[derive(Default)]
pub struct Mocks {
    pub users: MockUserRepository,
    pub projects: MockProjectRepository,
    pub comments: MockCommentRepository,
    pub ratings: MockRatingRepository,
    pub project_lists: MockProjectListRepository,
    pub identity: MockIdentityProvider,
    pub health: MockHealthCheck,
}

impl Mocks {
    /// Resolves `Bearer fu<id>` to user `id`; anything else is unknown.
    pub fn with_tokens(mut self) -> Self {
        self.identity.expect_resolve().returning(|token: &str| {
            Ok(token.strip_prefix("fu").and_then(|id| id.parse().ok()))
        });
        self
    }

    pub fn state(self) -> AppState {
        self.state_with_limit(1_000)
    }

    pub fn state_with_limit(self, requests: u32) -> AppState {
        let repos = Repositories {
            users: Arc::new(self.users),
            projects: Arc::new(self.projects),
            comments: Arc::new(self.comments),
            ratings: Arc::new(self.ratings),
            project_lists: Arc::new(self.project_lists),
        };
        AppState::new(
            Services::new(&repos),
            Arc::new(self.identity),
            Arc::new(self.health),
            RateLimiter::new(requests, Duration::from_secs(60)),
        )
    }
}

pub fn user(id: UserId) -> User {
    User {
        id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        username: format!("user{id}"),
        email: format!("user{id}@woodys.dev"),
        firebase_uid: format!("fu{id}"),
        reputation: 0.0,
        profile_picture: 0,
    }
}

pub fn project(id: ProjectId, owner: UserId) -> Project {
    Project {
        id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        owner,
        details: ProjectDetails {
            title: "Oak Table".into(),
            ..Default::default()
        },
        average_rating: 0.0,
        rating_count: 0,
    }
}

pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
