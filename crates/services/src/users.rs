use std::sync::Arc;

use domains::validation::{validate_external_uid, validate_id, validate_username};
use domains::{
    AppError, NewUser, OptionalExt, Pagination, Project, ProjectRepository, Result, ResultExt,
    User, UserCreateRequest, UserId, UserRepository, UserUpdateRequest, Validate,
};
use tracing::{info, instrument};

/// Weight applied to the sum of a user's project averages.
const REPUTATION_FACTOR: f64 = 0.1;

pub struct UserService {
    users: Arc<dyn UserRepository>,
    projects: Arc<dyn ProjectRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, projects: Arc<dyn ProjectRepository>) -> Self {
        Self { users, projects }
    }

    /// Signs a user up. Email and external identity token must both be unused.
    #[instrument(skip(self, req))]
    pub async fn create_user(&self, req: UserCreateRequest) -> Result<User> {
        let new_user = NewUser::normalized(&req);
        new_user.validate()?;

        if self.users.get_by_email(&new_user.email).await.optional()?.is_some() {
            return Err(AppError::Conflict(format!(
                "user with email {} already exists",
                new_user.email
            )));
        }
        if self
            .users
            .get_by_firebase_uid(&new_user.firebase_uid)
            .await
            .optional()?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "user with firebase_uid {} already exists",
                new_user.firebase_uid
            )));
        }

        let user = self.users.create(new_user).await.context("failed to create user")?;
        info!(user_id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User> {
        validate_id("user_id", id)?;
        self.users.get_by_id(id).await
    }

    pub async fn get_user_by_firebase_uid(&self, firebase_uid: &str) -> Result<User> {
        validate_external_uid(firebase_uid)?;
        self.users.get_by_firebase_uid(firebase_uid.trim()).await
    }

    #[instrument(skip(self, req))]
    pub async fn update_user(
        &self,
        caller: UserId,
        id: UserId,
        req: UserUpdateRequest,
    ) -> Result<User> {
        validate_id("user_id", id)?;
        let mut user = self.users.get_by_id(id).await?;
        if !user.can_be_edited_by(caller) {
            return Err(AppError::Unauthorized(format!(
                "user {caller} cannot edit user {id}"
            )));
        }

        if let Some(username) = req.username {
            let username = username.trim().to_string();
            validate_username(&username)?;
            user.username = username;
        }
        if let Some(reputation) = req.reputation {
            user.reputation = reputation;
        }
        if let Some(profile_picture) = req.profile_picture {
            user.profile_picture = profile_picture;
        }
        user.validate()?;

        self.users.update(&user).await.context("failed to update user")
    }

    /// Hard delete. Refused with `Conflict` while the user still owns content.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, caller: UserId, id: UserId) -> Result<()> {
        validate_id("user_id", id)?;
        let user = self.users.get_by_id(id).await?;
        if !user.can_be_deleted_by(caller) {
            return Err(AppError::Unauthorized(format!(
                "user {caller} cannot delete user {id}"
            )));
        }
        self.users.delete(id).await.context("failed to delete user")?;
        info!(user_id = id, "user deleted");
        Ok(())
    }

    pub async fn list_users(&self, page: Pagination) -> Result<Vec<User>> {
        self.users.list(page).await.context("failed to list users")
    }

    pub async fn get_user_projects(&self, user_id: UserId, page: Pagination) -> Result<Vec<Project>> {
        validate_id("user_id", user_id)?;
        self.users.get_by_id(user_id).await?;
        self.projects
            .get_by_owner(user_id, page)
            .await
            .context("failed to get user projects")
    }

    /// Reputation derived from the user's rated projects: the sum of their
    /// averages weighted by 0.1. Read-only; nothing is stored.
    pub async fn calculate_reputation(&self, user_id: UserId) -> Result<f64> {
        validate_id("user_id", user_id)?;
        self.users.get_by_id(user_id).await?;

        let mut page = Pagination::new(Some(Pagination::MAX_LIMIT), None)?;
        let mut rated_total = 0.0;
        loop {
            let projects = self.projects.get_by_owner(user_id, page).await?;
            let fetched = projects.len() as i64;
            for project in projects.iter().filter(|p| p.rating_count > 0) {
                rated_total += project.average_rating;
            }
            if fetched < page.limit() {
                break;
            }
            page = Pagination::new(Some(page.limit()), Some(page.offset() + fetched))?;
        }

        Ok(rated_total * REPUTATION_FACTOR)
    }
}
