//! # services
//!
//! Business rules of the Woodys backend. Services check that referenced
//! entities exist, enforce ownership through the domain predicates, guard the
//! uniqueness invariants and trigger the rating aggregate recompute. They talk
//! to storage only through the ports in `domains`.

pub mod comments;
pub mod project_lists;
pub mod projects;
pub mod ratings;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use domains::Repositories;

pub use comments::CommentService;
pub use project_lists::ProjectListService;
pub use projects::ProjectService;
pub use ratings::RatingService;
pub use users::UserService;

/// All services, built once at startup from the repository handles.
#[derive(Clone)]
pub struct Services {
    pub users: Arc<UserService>,
    pub projects: Arc<ProjectService>,
    pub comments: Arc<CommentService>,
    pub ratings: Arc<RatingService>,
    pub project_lists: Arc<ProjectListService>,
}

impl Services {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            users: Arc::new(UserService::new(repos.users.clone(), repos.projects.clone())),
            projects: Arc::new(ProjectService::new(repos.projects.clone(), repos.users.clone())),
            comments: Arc::new(CommentService::new(
                repos.comments.clone(),
                repos.users.clone(),
                repos.projects.clone(),
            )),
            ratings: Arc::new(RatingService::new(
                repos.ratings.clone(),
                repos.projects.clone(),
                repos.users.clone(),
            )),
            project_lists: Arc::new(ProjectListService::new(
                repos.project_lists.clone(),
                repos.projects.clone(),
                repos.users.clone(),
            )),
        }
    }
}
