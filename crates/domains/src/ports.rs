//! # Core Traits (Ports)
//!
//! Every store adapter must implement these traits to be wired into the services.
//! Lookups by id fail with [`AppError::NotFound`](crate::AppError::NotFound);
//! list operations order newest first unless stated otherwise.

use std::sync::Arc;

use async_trait::async_trait;

use crate::aggregation::{RatingAggregate, RatingStats};
use crate::error::Result;
use crate::models::*;
use crate::pagination::Pagination;

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn get_by_id(&self, id: UserId) -> Result<User>;
    async fn get_by_email(&self, email: &str) -> Result<User>;
    async fn get_by_firebase_uid(&self, firebase_uid: &str) -> Result<User>;
    /// Fails with `NotFound` if the row vanished since it was read.
    async fn update(&self, user: &User) -> Result<User>;
    /// Fails with `Conflict` while the user still owns content.
    async fn delete(&self, id: UserId) -> Result<()>;
    async fn list(&self, page: Pagination) -> Result<Vec<User>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: NewProject) -> Result<Project>;
    async fn get_by_id(&self, id: ProjectId) -> Result<Project>;
    async fn get_by_owner(&self, owner: UserId, page: Pagination) -> Result<Vec<Project>>;
    async fn update(&self, project: &Project) -> Result<Project>;
    /// Ratings, comments and list memberships of the project go with it.
    async fn delete(&self, id: ProjectId) -> Result<()>;
    /// Ranked by average rating, then newest first.
    async fn search(&self, filters: &ProjectSearchFilters) -> Result<Vec<Project>>;
    async fn list(&self, page: Pagination) -> Result<Vec<Project>>;
    /// Rated projects only; average desc, count desc, newest first.
    async fn list_popular(&self, page: Pagination) -> Result<Vec<Project>>;
    /// Recomputes and stores the project's rating aggregate in one atomic step.
    async fn refresh_rating_aggregate(&self, id: ProjectId) -> Result<RatingAggregate>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> Result<Comment>;
    async fn get_by_id(&self, id: CommentId) -> Result<Comment>;
    /// Non-deleted top-level comments of a project with author info and reply counts.
    async fn list_top_level(&self, project_id: ProjectId) -> Result<Vec<CommentWithAuthor>>;
    /// Non-deleted direct replies, oldest first.
    async fn list_replies(&self, parent_id: CommentId) -> Result<Vec<CommentWithAuthor>>;
    async fn list_by_user(&self, user_id: UserId, page: Pagination) -> Result<Vec<Comment>>;
    async fn update(&self, comment: &Comment) -> Result<Comment>;
    /// Flags the comment deleted and replaces its content with the tombstone.
    async fn soft_delete(&self, id: CommentId) -> Result<Comment>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Fails with `Conflict` if the (user, project) pair is already rated.
    async fn create(&self, rating: NewRating) -> Result<Rating>;
    async fn get_by_id(&self, id: RatingId) -> Result<Rating>;
    async fn get_by_user_and_project(&self, user_id: UserId, project_id: ProjectId) -> Result<Rating>;
    async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<RatingResponse>>;
    async fn list_by_user(&self, user_id: UserId, page: Pagination) -> Result<Vec<Rating>>;
    async fn update(&self, rating: &Rating) -> Result<Rating>;
    async fn delete(&self, id: RatingId) -> Result<()>;
    async fn get_project_stats(&self, project_id: ProjectId) -> Result<RatingStats>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProjectListRepository: Send + Sync {
    async fn create(&self, list: NewProjectList) -> Result<ProjectList>;
    async fn get_by_id(&self, id: ProjectListId) -> Result<ProjectList>;
    /// All lists of a user with their project counts.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<ProjectListResponse>>;
    async fn list_public(&self, page: Pagination) -> Result<Vec<ProjectListResponse>>;
    async fn update(&self, list: &ProjectList) -> Result<ProjectList>;
    /// Deletes the list and its items in one transaction.
    async fn delete(&self, id: ProjectListId) -> Result<()>;
    /// Fails with `Conflict` if the project is already in the list.
    async fn add_project(&self, item: NewProjectListItem) -> Result<ProjectListItem>;
    /// Fails with `NotFound` if the project is not in the list.
    async fn remove_project(&self, list_id: ProjectListId, project_id: ProjectId) -> Result<()>;
    async fn get_with_projects(&self, id: ProjectListId) -> Result<ProjectListResponse>;
    async fn is_project_in_list(&self, list_id: ProjectListId, project_id: ProjectId) -> Result<bool>;
}

/// Resolves an opaque credential presented by a caller to a user id.
///
/// Returns `Ok(None)` for credentials that do not belong to any user.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Option<UserId>>;
}

/// Liveness check of the backing store.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<()>;
}

/// One handle per repository port, shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub ratings: Arc<dyn RatingRepository>,
    pub project_lists: Arc<dyn ProjectListRepository>,
}
