use std::sync::Arc;

use domains::validation::{validate_comment_content, validate_id};
use domains::{
    parse_comment_rating, AppError, Comment, CommentBody, CommentCreateRequest, CommentId,
    CommentRepository, CommentResponse, CommentUpdateRequest, NewComment, Pagination, ProjectId,
    ProjectRepository, Result, ResultExt, UserId, UserRepository, Validate, ValidationError,
};
use tracing::{debug, info, instrument};

/// Comments and one-level reply threads on projects.
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
    projects: Arc<dyn ProjectRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        users: Arc<dyn UserRepository>,
        projects: Arc<dyn ProjectRepository>,
    ) -> Self {
        Self {
            comments,
            users,
            projects,
        }
    }

    #[instrument(skip(self, req), fields(project_id = req.project_id))]
    pub async fn create_comment(&self, caller: UserId, req: CommentCreateRequest) -> Result<Comment> {
        let new_comment = Self::new_comment(caller, req, None)?;

        self.users.get_by_id(caller).await?;
        self.projects.get_by_id(new_comment.project_id).await?;

        let comment = self
            .comments
            .create(new_comment)
            .await
            .context("failed to create comment")?;
        info!(comment_id = comment.id, "comment created");
        Ok(comment)
    }

    /// Replies always hang directly under `parent_id`, even when the parent
    /// is itself a reply.
    #[instrument(skip(self, req))]
    pub async fn create_reply(
        &self,
        caller: UserId,
        parent_id: CommentId,
        req: CommentCreateRequest,
    ) -> Result<Comment> {
        validate_id("parent_comment_id", parent_id)?;
        let new_comment = Self::new_comment(caller, req, Some(parent_id))?;

        let parent = self.comments.get_by_id(parent_id).await?;
        if parent.project_id != new_comment.project_id {
            return Err(ValidationError::new(
                "project_id",
                "reply must belong to the same project as its parent",
            )
            .into());
        }
        self.users.get_by_id(caller).await?;

        let reply = self
            .comments
            .create(new_comment)
            .await
            .context("failed to create reply")?;
        info!(comment_id = reply.id, parent_id, "reply created");
        Ok(reply)
    }

    fn new_comment(
        caller: UserId,
        req: CommentCreateRequest,
        parent_comment_id: Option<CommentId>,
    ) -> Result<NewComment> {
        let new_comment = NewComment {
            project_id: req.project_id,
            user_id: caller,
            content: req.content.trim().to_string(),
            rating: parse_comment_rating(req.rating)?,
            parent_comment_id,
        };
        new_comment.validate()?;
        Ok(new_comment)
    }

    /// Live top-level comments, newest first, each with its live replies attached.
    pub async fn get_project_comments(&self, project_id: ProjectId) -> Result<Vec<CommentResponse>> {
        validate_id("project_id", project_id)?;
        self.projects.get_by_id(project_id).await?;

        let top_level = self
            .comments
            .list_top_level(project_id)
            .await
            .context("failed to get project comments")?;

        let mut responses = Vec::with_capacity(top_level.len());
        for comment in top_level {
            let replies = self
                .comments
                .list_replies(comment.comment.id)
                .await
                .context("failed to get comment replies")?
                .into_iter()
                .map(|r| r.into_reply())
                .collect();
            responses.push(comment.into_top_level(replies));
        }
        debug!(project_id, count = responses.len(), "loaded project comments");
        Ok(responses)
    }

    pub async fn get_comment_replies(&self, parent_id: CommentId) -> Result<Vec<CommentResponse>> {
        validate_id("comment_id", parent_id)?;
        self.comments.get_by_id(parent_id).await?;
        let replies = self
            .comments
            .list_replies(parent_id)
            .await
            .context("failed to get comment replies")?;
        Ok(replies.into_iter().map(|r| r.into_reply()).collect())
    }

    #[instrument(skip(self, req))]
    pub async fn update_comment(
        &self,
        caller: UserId,
        id: CommentId,
        req: CommentUpdateRequest,
    ) -> Result<Comment> {
        validate_id("comment_id", id)?;
        let mut comment = self.comments.get_by_id(id).await?;
        if !comment.can_be_edited_by(caller) {
            return Err(AppError::Unauthorized(format!(
                "user {caller} cannot edit comment {id}"
            )));
        }

        if let Some(content) = req.content {
            let content = content.trim().to_string();
            validate_comment_content(&content)?;
            comment.body = CommentBody::Active { content };
        }
        if req.rating.is_some() {
            comment.rating = parse_comment_rating(req.rating)?;
        }
        comment.validate()?;

        self.comments
            .update(&comment)
            .await
            .context("failed to update comment")
    }

    /// Soft delete. Deleting an already deleted comment succeeds without a write.
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, caller: UserId, id: CommentId) -> Result<()> {
        validate_id("comment_id", id)?;
        let comment = self.comments.get_by_id(id).await?;
        if !comment.can_be_deleted_by(caller) {
            return Err(AppError::Unauthorized(format!(
                "user {caller} cannot delete comment {id}"
            )));
        }
        if comment.is_deleted() {
            debug!(comment_id = id, "comment already deleted");
            return Ok(());
        }

        self.comments
            .soft_delete(id)
            .await
            .context("failed to delete comment")?;
        info!(comment_id = id, "comment deleted");
        Ok(())
    }

    pub async fn get_user_comments(&self, user_id: UserId, page: Pagination) -> Result<Vec<Comment>> {
        validate_id("user_id", user_id)?;
        self.users.get_by_id(user_id).await?;
        self.comments
            .list_by_user(user_id, page)
            .await
            .context("failed to get user comments")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{comment, project, user};
    use domains::{
        CommentWithAuthor, ErrorKind, MockCommentRepository, MockProjectRepository,
        MockUserRepository, COMMENT_TOMBSTONE,
    };
    use mockall::predicate::eq;

    struct Mocks {
        comments: MockCommentRepository,
        users: MockUserRepository,
        projects: MockProjectRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                comments: MockCommentRepository::new(),
                users: MockUserRepository::new(),
                projects: MockProjectRepository::new(),
            }
        }

        fn with_existing_user_and_project(mut self) -> Self {
            self.users.expect_get_by_id().returning(|id| Ok(user(id)));
            self.projects
                .expect_get_by_id()
                .returning(|id| Ok(project(id, 1)));
            self
        }

        fn build(self) -> CommentService {
            CommentService::new(
                Arc::new(self.comments),
                Arc::new(self.users),
                Arc::new(self.projects),
            )
        }
    }

    fn request(content: &str, rating: Option<i32>) -> CommentCreateRequest {
        CommentCreateRequest {
            project_id: 1,
            content: content.into(),
            rating,
        }
    }

    fn annotated(c: Comment, reply_count: i64) -> CommentWithAuthor {
        CommentWithAuthor {
            username: format!("user{}", c.user_id),
            comment: c,
            user_reputation: 0.5,
            reply_count,
        }
    }

    #[tokio::test]
    async fn zero_rating_means_no_rating() {
        let mut mocks = Mocks::new().with_existing_user_and_project();
        mocks
            .comments
            .expect_create()
            .withf(|new| new.rating.is_none() && new.content == "Nice grain")
            .returning(|new| {
                let mut c = comment(1, new.project_id, new.user_id);
                c.rating = new.rating;
                Ok(c)
            });

        let created = mocks
            .build()
            .create_comment(2, request("  Nice grain ", Some(0)))
            .await
            .unwrap();
        assert_eq!(created.rating, None);
    }

    #[tokio::test]
    async fn blank_content_is_rejected() {
        let err = Mocks::new()
            .build()
            .create_comment(2, request("   ", None))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(v) => assert_eq!(v.field, "content"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn comment_on_missing_project_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.users.expect_get_by_id().returning(|id| Ok(user(id)));
        mocks
            .projects
            .expect_get_by_id()
            .returning(|id| Err(AppError::not_found("project", id)));
        mocks.comments.expect_create().never();

        let err = mocks
            .build()
            .create_comment(2, request("hello", None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn replies_hang_under_the_named_parent() {
        let mut mocks = Mocks::new().with_existing_user_and_project();
        mocks.comments.expect_get_by_id().with(eq(7)).returning(|id| {
            let mut parent = comment(id, 1, 3);
            parent.parent_comment_id = Some(4);
            Ok(parent)
        });
        mocks
            .comments
            .expect_create()
            .withf(|new| new.parent_comment_id == Some(7))
            .returning(|new| {
                let mut c = comment(8, new.project_id, new.user_id);
                c.parent_comment_id = new.parent_comment_id;
                Ok(c)
            });

        let reply = mocks
            .build()
            .create_reply(2, 7, request("agreed", None))
            .await
            .unwrap();
        assert_eq!(reply.parent_comment_id, Some(7));
    }

    #[tokio::test]
    async fn reply_to_another_projects_comment_is_rejected() {
        let mut mocks = Mocks::new();
        mocks
            .comments
            .expect_get_by_id()
            .returning(|id| Ok(comment(id, 99, 3)));
        mocks.comments.expect_create().never();

        let err = mocks
            .build()
            .create_reply(2, 7, request("agreed", None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn project_comments_attach_replies_one_level_deep() {
        let mut mocks = Mocks::new().with_existing_user_and_project();
        mocks
            .comments
            .expect_list_top_level()
            .returning(|pid| Ok(vec![annotated(comment(1, pid, 2), 1), annotated(comment(2, pid, 3), 0)]));
        mocks
            .comments
            .expect_list_replies()
            .with(eq(1))
            .returning(|parent| {
                let mut reply = comment(5, 1, 4);
                reply.parent_comment_id = Some(parent);
                Ok(vec![annotated(reply, 2)])
            });
        mocks
            .comments
            .expect_list_replies()
            .with(eq(2))
            .returning(|_| Ok(vec![]));

        let comments = mocks.build().get_project_comments(1).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].reply_count, Some(1));
        assert_eq!(comments[0].replies.len(), 1);
        assert_eq!(comments[0].replies[0].reply_count, None);
        assert!(comments[0].replies[0].replies.is_empty());
        assert_eq!(comments[1].reply_count, Some(0));
    }

    #[tokio::test]
    async fn deleted_comments_cannot_be_edited() {
        let mut mocks = Mocks::new();
        mocks.comments.expect_get_by_id().returning(|id| {
            let mut c = comment(id, 1, 2);
            c.soft_delete();
            Ok(c)
        });
        mocks.comments.expect_update().never();

        let err = mocks
            .build()
            .update_comment(
                2,
                1,
                CommentUpdateRequest {
                    content: Some("revived".into()),
                    rating: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn update_can_clear_the_rating() {
        let mut mocks = Mocks::new();
        mocks.comments.expect_get_by_id().returning(|id| {
            let mut c = comment(id, 1, 2);
            c.rating = Some(4);
            Ok(c)
        });
        mocks
            .comments
            .expect_update()
            .withf(|c| c.rating.is_none() && c.content() == "Lovely dovetails")
            .returning(|c| Ok(c.clone()));

        let updated = mocks
            .build()
            .update_comment(
                2,
                1,
                CommentUpdateRequest {
                    content: None,
                    rating: Some(0),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.rating, None);
    }

    #[tokio::test]
    async fn only_the_author_may_delete() {
        let mut mocks = Mocks::new();
        mocks
            .comments
            .expect_get_by_id()
            .returning(|id| Ok(comment(id, 1, 2)));
        mocks.comments.expect_soft_delete().never();

        let err = mocks.build().delete_comment(3, 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn delete_writes_the_tombstone_once() {
        let mut mocks = Mocks::new();
        mocks
            .comments
            .expect_get_by_id()
            .times(1)
            .returning(|id| Ok(comment(id, 1, 2)));
        mocks
            .comments
            .expect_soft_delete()
            .times(1)
            .returning(|id| {
                let mut c = comment(id, 1, 2);
                c.soft_delete();
                Ok(c)
            });
        mocks.build().delete_comment(2, 1).await.unwrap();

        let mut mocks = Mocks::new();
        mocks.comments.expect_get_by_id().returning(|id| {
            let mut c = comment(id, 1, 2);
            c.soft_delete();
            assert_eq!(c.content(), COMMENT_TOMBSTONE);
            Ok(c)
        });
        mocks.comments.expect_soft_delete().never();
        mocks.build().delete_comment(2, 1).await.unwrap();
    }
}
