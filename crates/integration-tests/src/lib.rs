//! Shared fixtures for the end-to-end tests: every service and the HTTP
//! router wired onto a fresh in-memory SQLite store.

use std::sync::Arc;
use std::time::Duration;

use api_adapters::{AppState, RateLimiter};
use auth_adapters::ExternalUidIdentityProvider;
use domains::{Project, ProjectDetails, User, UserCreateRequest};
use services::Services;
use storage_adapters::{SqlitePool, SqlitePoolHealth};

pub struct TestApp {
    pub pool: SqlitePool,
    pub services: Services,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = storage_adapters::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory database");
        let repos = storage_adapters::repositories(pool.clone());
        let services = Services::new(&repos);
        let state = AppState::new(
            services.clone(),
            Arc::new(ExternalUidIdentityProvider::new(repos.users.clone())),
            Arc::new(SqlitePoolHealth::new(pool.clone())),
            RateLimiter::new(10_000, Duration::from_secs(60)),
        );
        Self {
            pool,
            services,
            state,
        }
    }

    pub fn router(&self) -> axum::Router {
        api_adapters::router(self.state.clone())
    }

    /// Signs up `name` with email `<name>@woodys.dev` and token `fu-<name>`.
    pub async fn user(&self, name: &str) -> User {
        self.services
            .users
            .create_user(UserCreateRequest {
                username: name.into(),
                email: format!("{name}@woodys.dev"),
                firebase_uid: format!("fu-{name}"),
            })
            .await
            .expect("user fixture")
    }

    pub async fn project(&self, owner: &User, title: &str) -> Project {
        self.services
            .projects
            .create_project(
                owner.id,
                ProjectDetails {
                    title: title.into(),
                    ..Default::default()
                },
            )
            .await
            .expect("project fixture")
    }
}
