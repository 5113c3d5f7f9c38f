use std::sync::Arc;

use domains::validation::{validate_id, validate_list_name};
use domains::{
    AddProjectRequest, AppError, NewProjectList, NewProjectListItem, Pagination, ProjectId,
    ProjectList, ProjectListCreateRequest, ProjectListId, ProjectListItem, ProjectListRepository,
    ProjectListResponse, ProjectListUpdateRequest, ProjectRepository, Result, ResultExt, UserId,
    UserRepository, Validate,
};
use tracing::{info, instrument};

pub struct ProjectListService {
    lists: Arc<dyn ProjectListRepository>,
    projects: Arc<dyn ProjectRepository>,
    users: Arc<dyn UserRepository>,
}

impl ProjectListService {
    pub fn new(
        lists: Arc<dyn ProjectListRepository>,
        projects: Arc<dyn ProjectRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            lists,
            projects,
            users,
        }
    }

    #[instrument(skip(self, req))]
    pub async fn create_project_list(
        &self,
        caller: UserId,
        req: ProjectListCreateRequest,
    ) -> Result<ProjectList> {
        let new_list = NewProjectList {
            user_id: caller,
            name: req.name.trim().to_string(),
            is_public: req.is_public,
        };
        new_list.validate()?;

        self.users.get_by_id(caller).await?;

        let list = self
            .lists
            .create(new_list)
            .await
            .context("failed to create project list")?;
        info!(list_id = list.id, "project list created");
        Ok(list)
    }

    /// A list with its projects. Private lists are only visible to their owner.
    pub async fn get_project_list(
        &self,
        viewer: Option<UserId>,
        id: ProjectListId,
    ) -> Result<ProjectListResponse> {
        validate_id("project_list_id", id)?;
        let response = self.lists.get_with_projects(id).await?;
        if !response.list.can_be_accessed_by(viewer) {
            return Err(AppError::Unauthorized(format!(
                "project list {id} is private"
            )));
        }
        Ok(response)
    }

    /// Everything for the owner, public lists for anyone else.
    pub async fn get_user_project_lists(
        &self,
        viewer: Option<UserId>,
        user_id: UserId,
    ) -> Result<Vec<ProjectListResponse>> {
        validate_id("user_id", user_id)?;
        self.users.get_by_id(user_id).await?;
        let lists = self
            .lists
            .list_by_user(user_id)
            .await
            .context("failed to get user project lists")?;
        Ok(lists
            .into_iter()
            .filter(|l| l.list.can_be_accessed_by(viewer))
            .collect())
    }

    pub async fn get_public_project_lists(&self, page: Pagination) -> Result<Vec<ProjectListResponse>> {
        self.lists
            .list_public(page)
            .await
            .context("failed to get public project lists")
    }

    #[instrument(skip(self, req))]
    pub async fn update_project_list(
        &self,
        caller: UserId,
        id: ProjectListId,
        req: ProjectListUpdateRequest,
    ) -> Result<ProjectList> {
        let mut list = self.owned_list(caller, id).await?;
        if let Some(name) = req.name {
            let name = name.trim().to_string();
            validate_list_name(&name)?;
            list.name = name;
        }
        if let Some(is_public) = req.is_public {
            list.is_public = is_public;
        }
        list.validate()?;

        self.lists
            .update(&list)
            .await
            .context("failed to update project list")
    }

    /// Deletes the list and all of its items together.
    #[instrument(skip(self))]
    pub async fn delete_project_list(&self, caller: UserId, id: ProjectListId) -> Result<()> {
        validate_id("project_list_id", id)?;
        let list = self.lists.get_by_id(id).await?;
        if !list.can_be_deleted_by(caller) {
            return Err(AppError::Unauthorized(format!(
                "user {caller} cannot delete project list {id}"
            )));
        }
        self.lists
            .delete(id)
            .await
            .context("failed to delete project list")?;
        info!(list_id = id, "project list deleted");
        Ok(())
    }

    #[instrument(skip(self, req), fields(project_id = req.project_id))]
    pub async fn add_project_to_list(
        &self,
        caller: UserId,
        list_id: ProjectListId,
        req: AddProjectRequest,
    ) -> Result<ProjectListItem> {
        let item = NewProjectListItem {
            project_list_id: list_id,
            project_id: req.project_id,
        };
        item.validate()?;

        self.owned_list(caller, list_id).await?;
        self.projects.get_by_id(req.project_id).await?;

        if self.lists.is_project_in_list(list_id, req.project_id).await? {
            return Err(AppError::Conflict(format!(
                "project {} is already in list {list_id}",
                req.project_id
            )));
        }

        let item = self
            .lists
            .add_project(item)
            .await
            .context("failed to add project to list")?;
        info!(list_id, "project added to list");
        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn remove_project_from_list(
        &self,
        caller: UserId,
        list_id: ProjectListId,
        project_id: ProjectId,
    ) -> Result<()> {
        validate_id("project_id", project_id)?;
        self.owned_list(caller, list_id).await?;

        if !self.lists.is_project_in_list(list_id, project_id).await? {
            return Err(AppError::NotFound(format!(
                "project {project_id} not found in list {list_id}"
            )));
        }

        self.lists
            .remove_project(list_id, project_id)
            .await
            .context("failed to remove project from list")?;
        info!(list_id, project_id, "project removed from list");
        Ok(())
    }

    /// Membership check, subject to the same visibility rule as viewing the list.
    pub async fn is_project_in_list(
        &self,
        viewer: Option<UserId>,
        list_id: ProjectListId,
        project_id: ProjectId,
    ) -> Result<bool> {
        validate_id("project_list_id", list_id)?;
        validate_id("project_id", project_id)?;
        let list = self.lists.get_by_id(list_id).await?;
        if !list.can_be_accessed_by(viewer) {
            return Err(AppError::Unauthorized(format!(
                "project list {list_id} is private"
            )));
        }
        self.lists.is_project_in_list(list_id, project_id).await
    }

    async fn owned_list(&self, caller: UserId, id: ProjectListId) -> Result<ProjectList> {
        validate_id("project_list_id", id)?;
        let list = self.lists.get_by_id(id).await?;
        if !list.can_be_edited_by(caller) {
            return Err(AppError::Unauthorized(format!(
                "user {caller} cannot modify project list {id}"
            )));
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{project, project_list, user};
    use chrono::Utc;
    use domains::{ErrorKind, MockProjectListRepository, MockProjectRepository, MockUserRepository};
    use mockall::predicate::eq;

    struct Mocks {
        lists: MockProjectListRepository,
        projects: MockProjectRepository,
        users: MockUserRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                lists: MockProjectListRepository::new(),
                projects: MockProjectRepository::new(),
                users: MockUserRepository::new(),
            }
        }

        fn with_list(mut self, owner: UserId, is_public: bool) -> Self {
            self.lists
                .expect_get_by_id()
                .returning(move |id| Ok(project_list(id, owner, is_public)));
            self
        }

        fn build(self) -> ProjectListService {
            ProjectListService::new(
                Arc::new(self.lists),
                Arc::new(self.projects),
                Arc::new(self.users),
            )
        }
    }

    fn response(list: ProjectList, project_count: i64) -> ProjectListResponse {
        ProjectListResponse {
            list,
            project_count,
            projects: Vec::new(),
        }
    }

    #[tokio::test]
    async fn private_list_is_hidden_from_other_users() {
        let mut mocks = Mocks::new();
        mocks
            .lists
            .expect_get_with_projects()
            .returning(|id| Ok(response(project_list(id, 1, false), 0)));
        let svc = mocks.build();

        assert_eq!(
            svc.get_project_list(Some(2), 5).await.unwrap_err().kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            svc.get_project_list(None, 5).await.unwrap_err().kind(),
            ErrorKind::Unauthorized
        );
        assert!(svc.get_project_list(Some(1), 5).await.is_ok());
    }

    #[tokio::test]
    async fn other_users_only_see_public_lists() {
        let mut mocks = Mocks::new();
        mocks.users.expect_get_by_id().returning(|id| Ok(user(id)));
        mocks.lists.expect_list_by_user().returning(|owner| {
            Ok(vec![
                response(project_list(1, owner, true), 2),
                response(project_list(2, owner, false), 1),
            ])
        });
        let svc = mocks.build();

        let visible = svc.get_user_project_lists(Some(2), 1).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert!(visible[0].list.is_public);

        let own = svc.get_user_project_lists(Some(1), 1).await.unwrap();
        assert_eq!(own.len(), 2);
    }

    #[tokio::test]
    async fn blank_list_names_are_rejected() {
        let err = Mocks::new()
            .build()
            .create_project_list(
                1,
                ProjectListCreateRequest {
                    name: "   ".into(),
                    is_public: false,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn public_lists_are_still_owner_edited() {
        let mut mocks = Mocks::new().with_list(1, true);
        mocks.lists.expect_add_project().never();
        mocks.lists.expect_remove_project().never();
        let svc = mocks.build();

        let err = svc
            .add_project_to_list(2, 5, AddProjectRequest { project_id: 10 })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = svc.remove_project_from_list(2, 5, 10).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn duplicate_membership_is_a_conflict() {
        let mut mocks = Mocks::new().with_list(1, false);
        mocks.projects.expect_get_by_id().returning(|id| Ok(project(id, 1)));
        mocks
            .lists
            .expect_is_project_in_list()
            .with(eq(5), eq(10))
            .returning(|_, _| Ok(true));
        mocks.lists.expect_add_project().never();

        let err = mocks
            .build()
            .add_project_to_list(1, 5, AddProjectRequest { project_id: 10 })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn owner_adds_a_project() {
        let mut mocks = Mocks::new().with_list(1, false);
        mocks.projects.expect_get_by_id().returning(|id| Ok(project(id, 3)));
        mocks
            .lists
            .expect_is_project_in_list()
            .returning(|_, _| Ok(false));
        mocks.lists.expect_add_project().returning(|item| {
            Ok(ProjectListItem {
                id: 1,
                created_at: Utc::now(),
                project_list_id: item.project_list_id,
                project_id: item.project_id,
            })
        });

        let item = mocks
            .build()
            .add_project_to_list(1, 5, AddProjectRequest { project_id: 10 })
            .await
            .unwrap();
        assert_eq!((item.project_list_id, item.project_id), (5, 10));
    }

    #[tokio::test]
    async fn adding_to_a_missing_list_is_not_found() {
        let mut mocks = Mocks::new();
        mocks
            .lists
            .expect_get_by_id()
            .returning(|id| Err(AppError::not_found("project list", id)));

        let err = mocks
            .build()
            .add_project_to_list(1, 5, AddProjectRequest { project_id: 10 })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn removing_an_absent_project_is_not_found() {
        let mut mocks = Mocks::new().with_list(1, false);
        mocks
            .lists
            .expect_is_project_in_list()
            .returning(|_, _| Ok(false));
        mocks.lists.expect_remove_project().never();

        let err = mocks
            .build()
            .remove_project_from_list(1, 5, 10)
            .await
            .unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "project 10 not found in list 5"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn only_the_owner_deletes_a_list() {
        let mut mocks = Mocks::new().with_list(1, true);
        mocks.lists.expect_delete().never();

        let err = mocks.build().delete_project_list(2, 5).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn rename_is_trimmed_and_validated() {
        let mut mocks = Mocks::new().with_list(1, false);
        mocks
            .lists
            .expect_update()
            .withf(|l| l.name == "Shop jigs" && l.is_public)
            .returning(|l| Ok(l.clone()));

        let updated = mocks
            .build()
            .update_project_list(
                1,
                5,
                ProjectListUpdateRequest {
                    name: Some(" Shop jigs ".into()),
                    is_public: Some(true),
                },
            )
            .await
            .unwrap();
        assert!(updated.is_public);
    }
}
