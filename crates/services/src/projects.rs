use std::sync::Arc;

use domains::validation::validate_id;
use domains::{
    AppError, NewProject, Pagination, Project, ProjectDetails, ProjectId, ProjectRepository,
    ProjectSearchFilters, ProjectUpdateRequest, Result, ResultExt, UserId, UserRepository,
    Validate, ValidationError,
};
use tracing::{debug, info, instrument};

pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    users: Arc<dyn UserRepository>,
}

impl ProjectService {
    pub fn new(projects: Arc<dyn ProjectRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { projects, users }
    }

    /// Publishes a project owned by the caller. The aggregate starts at 0/0.
    #[instrument(skip(self, details))]
    pub async fn create_project(&self, caller: UserId, mut details: ProjectDetails) -> Result<Project> {
        details.title = details.title.trim().to_string();
        let new_project = NewProject {
            owner: caller,
            details,
        };
        new_project.validate()?;

        self.users.get_by_id(caller).await?;

        let project = self
            .projects
            .create(new_project)
            .await
            .context("failed to create project")?;
        info!(project_id = project.id, owner = caller, "project created");
        Ok(project)
    }

    pub async fn get_project(&self, id: ProjectId) -> Result<Project> {
        validate_id("project_id", id)?;
        self.projects.get_by_id(id).await
    }

    #[instrument(skip(self, req))]
    pub async fn update_project(
        &self,
        caller: UserId,
        id: ProjectId,
        req: ProjectUpdateRequest,
    ) -> Result<Project> {
        validate_id("project_id", id)?;
        let mut project = self.projects.get_by_id(id).await?;
        if !project.can_be_edited_by(caller) {
            return Err(AppError::Unauthorized(format!(
                "user {caller} cannot edit project {id}"
            )));
        }

        req.apply_to(&mut project.details);
        project.details.title = project.details.title.trim().to_string();
        project.validate()?;

        self.projects
            .update(&project)
            .await
            .context("failed to update project")
    }

    /// Removes the project along with its ratings, comments and list memberships.
    #[instrument(skip(self))]
    pub async fn delete_project(&self, caller: UserId, id: ProjectId) -> Result<()> {
        validate_id("project_id", id)?;
        let project = self.projects.get_by_id(id).await?;
        if !project.can_be_deleted_by(caller) {
            return Err(AppError::Unauthorized(format!(
                "user {caller} cannot delete project {id}"
            )));
        }
        self.projects
            .delete(id)
            .await
            .context("failed to delete project")?;
        info!(project_id = id, "project deleted");
        Ok(())
    }

    pub async fn search_projects(&self, filters: ProjectSearchFilters) -> Result<Vec<Project>> {
        if let Some(max) = filters.max_time_to_build {
            if max < 0 {
                return Err(ValidationError::new(
                    "max_time_to_build",
                    "max time to build cannot be negative",
                )
                .into());
            }
        }
        if let Some(min) = filters.min_rating {
            if !(0.0..=5.0).contains(&min) {
                return Err(
                    ValidationError::new("min_rating", "min rating must be between 0 and 5").into(),
                );
            }
        }
        debug!(?filters, "searching projects");
        self.projects
            .search(&filters)
            .await
            .context("failed to search projects")
    }

    pub async fn list_projects(&self, page: Pagination) -> Result<Vec<Project>> {
        self.projects.list(page).await.context("failed to list projects")
    }

    pub async fn get_projects_by_owner(&self, owner: UserId, page: Pagination) -> Result<Vec<Project>> {
        validate_id("owner", owner)?;
        self.projects
            .get_by_owner(owner, page)
            .await
            .context("failed to get projects by owner")
    }

    pub async fn get_popular_projects(&self, page: Pagination) -> Result<Vec<Project>> {
        self.projects
            .list_popular(page)
            .await
            .context("failed to get popular projects")
    }

    /// Newest first; same ordering as the plain listing.
    pub async fn get_recent_projects(&self, page: Pagination) -> Result<Vec<Project>> {
        self.projects
            .list(page)
            .await
            .context("failed to get recent projects")
    }
}
