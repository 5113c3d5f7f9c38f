use std::sync::Arc;

use domains::validation::{validate_id, validate_rating_value};
use domains::{
    AppError, NewRating, OptionalExt, Pagination, ProjectId, ProjectRepository, Rating,
    RatingCreateRequest, RatingRepository, RatingResponse, RatingStats, RatingUpdateRequest,
    Result, ResultExt, UserId, UserRepository, Validate, ValidationError,
};
use tracing::{debug, info, instrument, warn};

/// Ratings keyed by (caller, project). Every mutation refreshes the project's
/// rating aggregate.
pub struct RatingService {
    ratings: Arc<dyn RatingRepository>,
    projects: Arc<dyn ProjectRepository>,
    users: Arc<dyn UserRepository>,
}

impl RatingService {
    pub fn new(
        ratings: Arc<dyn RatingRepository>,
        projects: Arc<dyn ProjectRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            ratings,
            projects,
            users,
        }
    }

    #[instrument(skip(self, req), fields(project_id = req.project_id))]
    pub async fn create_rating(&self, caller: UserId, req: RatingCreateRequest) -> Result<Rating> {
        let new_rating = NewRating {
            value: req.value,
            user_id: caller,
            project_id: req.project_id,
        };
        new_rating.validate()?;

        self.users.get_by_id(caller).await?;
        self.projects.get_by_id(req.project_id).await?;

        if self
            .ratings
            .get_by_user_and_project(caller, req.project_id)
            .await
            .optional()?
            .is_some()
        {
            return Err(AppError::Conflict("user has already rated this project".into()));
        }

        let rating = self
            .ratings
            .create(new_rating)
            .await
            .context("failed to create rating")?;
        info!(rating_id = rating.id, value = rating.value, "rating created");

        self.refresh_aggregate(rating.project_id).await;
        Ok(rating)
    }

    #[instrument(skip(self, req))]
    pub async fn update_rating(
        &self,
        caller: UserId,
        project_id: ProjectId,
        req: RatingUpdateRequest,
    ) -> Result<Rating> {
        validate_id("project_id", project_id)?;
        let value = req
            .value
            .ok_or_else(|| ValidationError::new("value", "value is required"))?;
        validate_rating_value("value", value)?;

        let mut rating = self.ratings.get_by_user_and_project(caller, project_id).await?;
        if !rating.can_be_edited_by(caller) {
            return Err(AppError::Unauthorized(format!(
                "user {caller} cannot edit rating {}",
                rating.id
            )));
        }
        rating.value = value;

        let rating = self
            .ratings
            .update(&rating)
            .await
            .context("failed to update rating")?;
        info!(rating_id = rating.id, value, "rating updated");

        self.refresh_aggregate(project_id).await;
        Ok(rating)
    }

    #[instrument(skip(self))]
    pub async fn delete_rating(&self, caller: UserId, project_id: ProjectId) -> Result<()> {
        validate_id("project_id", project_id)?;
        let rating = self.ratings.get_by_user_and_project(caller, project_id).await?;
        if !rating.can_be_deleted_by(caller) {
            return Err(AppError::Unauthorized(format!(
                "user {caller} cannot delete rating {}",
                rating.id
            )));
        }

        self.ratings
            .delete(rating.id)
            .await
            .context("failed to delete rating")?;
        info!(rating_id = rating.id, "rating deleted");

        self.refresh_aggregate(project_id).await;
        Ok(())
    }

    /// Best effort: a failed recompute is logged and left for the next
    /// rating mutation to correct.
    async fn refresh_aggregate(&self, project_id: ProjectId) {
        match self.projects.refresh_rating_aggregate(project_id).await {
            Ok(aggregate) => debug!(
                project_id,
                average_rating = aggregate.average_rating,
                rating_count = aggregate.rating_count,
                "rating aggregate refreshed"
            ),
            Err(e) => warn!(project_id, error = %e, "failed to refresh rating aggregate"),
        }
    }

    pub async fn get_project_ratings(&self, project_id: ProjectId) -> Result<Vec<RatingResponse>> {
        validate_id("project_id", project_id)?;
        self.projects.get_by_id(project_id).await?;
        self.ratings
            .list_by_project(project_id)
            .await
            .context("failed to get project ratings")
    }

    pub async fn get_user_rating(&self, user_id: UserId, project_id: ProjectId) -> Result<Rating> {
        validate_id("project_id", project_id)?;
        self.ratings.get_by_user_and_project(user_id, project_id).await
    }

    pub async fn get_user_ratings(&self, user_id: UserId, page: Pagination) -> Result<Vec<Rating>> {
        validate_id("user_id", user_id)?;
        self.users.get_by_id(user_id).await?;
        self.ratings
            .list_by_user(user_id, page)
            .await
            .context("failed to get user ratings")
    }

    pub async fn get_project_rating_stats(&self, project_id: ProjectId) -> Result<RatingStats> {
        validate_id("project_id", project_id)?;
        self.projects.get_by_id(project_id).await?;
        self.ratings
            .get_project_stats(project_id)
            .await
            .context("failed to get rating stats")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{project, rating, user};
    use domains::{
        ErrorKind, MockProjectRepository, MockRatingRepository, MockUserRepository,
        RatingAggregate,
    };
    use mockall::predicate::eq;

    struct Mocks {
        ratings: MockRatingRepository,
        projects: MockProjectRepository,
        users: MockUserRepository,
    }

    impl Mocks {
        fn new() -> Self {
            let mut users = MockUserRepository::new();
            users.expect_get_by_id().returning(|id| Ok(user(id)));
            let mut projects = MockProjectRepository::new();
            projects.expect_get_by_id().returning(|id| Ok(project(id, 1)));
            Self {
                ratings: MockRatingRepository::new(),
                projects,
                users,
            }
        }

        fn build(self) -> RatingService {
            RatingService::new(
                Arc::new(self.ratings),
                Arc::new(self.projects),
                Arc::new(self.users),
            )
        }
    }

    fn not_rated(mocks: &mut Mocks) {
        mocks
            .ratings
            .expect_get_by_user_and_project()
            .returning(|u, p| Err(AppError::NotFound(format!("rating by user {u} on project {p} not found"))));
    }

    #[tokio::test]
    async fn create_refreshes_the_aggregate() {
        let mut mocks = Mocks::new();
        not_rated(&mut mocks);
        mocks
            .ratings
            .expect_create()
            .returning(|new| Ok(rating(1, new.user_id, new.project_id, new.value)));
        mocks
            .projects
            .expect_refresh_rating_aggregate()
            .with(eq(10))
            .times(1)
            .returning(|_| {
                Ok(RatingAggregate {
                    average_rating: 5.0,
                    rating_count: 1,
                })
            });

        let created = mocks
            .build()
            .create_rating(
                2,
                RatingCreateRequest {
                    project_id: 10,
                    value: 5,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.value, 5);
    }

    #[tokio::test]
    async fn second_rating_is_a_conflict() {
        let mut mocks = Mocks::new();
        mocks
            .ratings
            .expect_get_by_user_and_project()
            .returning(|u, p| Ok(rating(1, u, p, 5)));
        mocks.ratings.expect_create().never();
        mocks.projects.expect_refresh_rating_aggregate().never();

        let err = mocks
            .build()
            .create_rating(
                2,
                RatingCreateRequest {
                    project_id: 10,
                    value: 4,
                },
            )
            .await
            .unwrap_err();
        match err {
            AppError::Conflict(msg) => assert_eq!(msg, "user has already rated this project"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn out_of_range_values_are_rejected() {
        for value in [0, 6, -3] {
            let err = Mocks::new()
                .build()
                .create_rating(
                    2,
                    RatingCreateRequest {
                        project_id: 10,
                        value,
                    },
                )
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "value {value}");
        }
    }

    #[tokio::test]
    async fn aggregate_failure_does_not_fail_the_rating() {
        let mut mocks = Mocks::new();
        not_rated(&mut mocks);
        mocks
            .ratings
            .expect_create()
            .returning(|new| Ok(rating(1, new.user_id, new.project_id, new.value)));
        mocks
            .projects
            .expect_refresh_rating_aggregate()
            .returning(|_| Err(AppError::Internal("database is locked".into())));

        let result = mocks
            .build()
            .create_rating(
                2,
                RatingCreateRequest {
                    project_id: 10,
                    value: 3,
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn update_of_missing_rating_is_not_found() {
        let mut mocks = Mocks::new();
        not_rated(&mut mocks);
        mocks.ratings.expect_update().never();

        let err = mocks
            .build()
            .update_rating(2, 10, RatingUpdateRequest { value: Some(3) })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn update_changes_the_value_and_refreshes() {
        let mut mocks = Mocks::new();
        mocks
            .ratings
            .expect_get_by_user_and_project()
            .returning(|u, p| Ok(rating(1, u, p, 5)));
        mocks
            .ratings
            .expect_update()
            .withf(|r| r.value == 3)
            .returning(|r| Ok(r.clone()));
        mocks
            .projects
            .expect_refresh_rating_aggregate()
            .times(1)
            .returning(|_| Ok(RatingAggregate::default()));

        let updated = mocks
            .build()
            .update_rating(2, 10, RatingUpdateRequest { value: Some(3) })
            .await
            .unwrap();
        assert_eq!(updated.value, 3);
    }

    #[tokio::test]
    async fn delete_refreshes_the_aggregate() {
        let mut mocks = Mocks::new();
        mocks
            .ratings
            .expect_get_by_user_and_project()
            .returning(|u, p| Ok(rating(4, u, p, 2)));
        mocks.ratings.expect_delete().with(eq(4)).returning(|_| Ok(()));
        mocks
            .projects
            .expect_refresh_rating_aggregate()
            .times(1)
            .returning(|_| Ok(RatingAggregate::default()));

        mocks.build().delete_rating(2, 10).await.unwrap();
    }

    #[tokio::test]
    async fn delete_of_missing_rating_is_not_found() {
        let mut mocks = Mocks::new();
        not_rated(&mut mocks);
        mocks.ratings.expect_delete().never();
        mocks.projects.expect_refresh_rating_aggregate().never();

        let err = mocks.build().delete_rating(2, 10).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
