use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommentId, ProjectId, UserId};
use crate::error::ValidationError;
use crate::validation::{validate_comment_content, validate_id, validate_rating_value, Validate};

/// Placeholder shown in place of a soft-deleted comment's text.
pub const COMMENT_TOMBSTONE: &str = "[This comment has been deleted]";

/// Whether a comment is live or has been soft-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CommentBody {
    Active { content: String },
    Deleted,
}

impl CommentBody {
    pub fn content(&self) -> &str {
        match self {
            CommentBody::Active { content } => content,
            CommentBody::Deleted => COMMENT_TOMBSTONE,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, CommentBody::Deleted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub project_id: ProjectId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub body: CommentBody,
    /// Optional 1–5 score attached to the comment
    pub rating: Option<i32>,
    /// Set when the comment is a reply
    pub parent_comment_id: Option<CommentId>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_comment_id.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.body.is_deleted()
    }

    pub fn content(&self) -> &str {
        self.body.content()
    }

    /// Deleted comments are frozen.
    pub fn can_be_edited_by(&self, caller: UserId) -> bool {
        self.user_id == caller && !self.is_deleted()
    }

    pub fn can_be_deleted_by(&self, caller: UserId) -> bool {
        self.user_id == caller
    }

    /// The single Active → Deleted transition. Replies, rating and ids stay intact.
    pub fn soft_delete(&mut self) {
        if !self.is_deleted() {
            self.body = CommentBody::Deleted;
            self.updated_at = Utc::now();
        }
    }
}

impl Validate for Comment {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_id("project_id", self.project_id)?;
        validate_id("user_id", self.user_id)?;
        if let CommentBody::Active { content } = &self.body {
            validate_comment_content(content)?;
        }
        if let Some(rating) = self.rating {
            validate_rating_value("rating", rating)?;
        }
        Ok(())
    }
}

/// Maps the wire convention (0 = no rating) onto `Option`.
pub fn parse_comment_rating(raw: Option<i32>) -> Result<Option<i32>, ValidationError> {
    match raw {
        None | Some(0) => Ok(None),
        Some(value) => {
            validate_rating_value("rating", value)?;
            Ok(Some(value))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub content: String,
    pub rating: Option<i32>,
    pub parent_comment_id: Option<CommentId>,
}

impl Validate for NewComment {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_id("project_id", self.project_id)?;
        validate_id("user_id", self.user_id)?;
        validate_comment_content(&self.content)?;
        if let Some(rating) = self.rating {
            validate_rating_value("rating", rating)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentCreateRequest {
    pub project_id: ProjectId,
    pub content: String,
    #[serde(default)]
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentUpdateRequest {
    pub content: Option<String>,
    pub rating: Option<i32>,
}

/// A comment as returned to clients, annotated with its author.
///
/// Top-level comments carry `reply_count` and their replies; replies carry neither.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentResponse {
    pub id: CommentId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub content: String,
    pub is_deleted: bool,
    pub rating: Option<i32>,
    pub parent_comment_id: Option<CommentId>,
    pub username: String,
    pub user_reputation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<CommentResponse>,
}

/// Store projection: a comment joined with its author and live reply count.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub username: String,
    pub user_reputation: f64,
    pub reply_count: i64,
}

impl CommentWithAuthor {
    pub fn into_top_level(self, replies: Vec<CommentResponse>) -> CommentResponse {
        let reply_count = self.reply_count;
        let mut response = self.into_reply();
        response.reply_count = Some(reply_count);
        response.replies = replies;
        response
    }

    pub fn into_reply(self) -> CommentResponse {
        let CommentWithAuthor {
            comment,
            username,
            user_reputation,
            ..
        } = self;
        CommentResponse {
            id: comment.id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            project_id: comment.project_id,
            user_id: comment.user_id,
            content: comment.content().to_string(),
            is_deleted: comment.is_deleted(),
            rating: comment.rating,
            parent_comment_id: comment.parent_comment_id,
            username,
            user_reputation,
            reply_count: None,
            replies: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment() -> Comment {
        Comment {
            id: 10,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            project_id: 1,
            user_id: 2,
            body: CommentBody::Active {
                content: "Nice joinery".into(),
            },
            rating: Some(4),
            parent_comment_id: None,
        }
    }

    #[test]
    fn soft_delete_is_idempotent() {
        let mut c = comment();
        c.soft_delete();
        let first = c.clone();
        c.soft_delete();

        assert_eq!(c, first);
        assert!(c.is_deleted());
        assert_eq!(c.content(), COMMENT_TOMBSTONE);
        assert_eq!(c.rating, Some(4));
        assert_eq!(c.id, 10);
    }

    #[test]
    fn deleted_comments_cannot_be_edited_but_can_be_deleted_again() {
        let mut c = comment();
        assert!(c.can_be_edited_by(2));
        assert!(!c.can_be_edited_by(3));
        c.soft_delete();
        assert!(!c.can_be_edited_by(2));
        assert!(c.can_be_deleted_by(2));
        assert!(!c.can_be_deleted_by(3));
    }

    #[test]
    fn rating_wire_convention() {
        assert_eq!(parse_comment_rating(None).unwrap(), None);
        assert_eq!(parse_comment_rating(Some(0)).unwrap(), None);
        assert_eq!(parse_comment_rating(Some(5)).unwrap(), Some(5));
        assert!(parse_comment_rating(Some(6)).is_err());
        assert!(parse_comment_rating(Some(-1)).is_err());
    }

    #[test]
    fn body_serializes_as_tagged_state() {
        let json = serde_json::to_value(comment()).unwrap();
        assert_eq!(json["state"], "active");
        assert_eq!(json["content"], "Nice joinery");

        let mut c = comment();
        c.soft_delete();
        let json = serde_json::to_value(c).unwrap();
        assert_eq!(json["state"], "deleted");
        assert!(json.get("content").is_none());
    }

    #[test]
    fn replies_do_not_expose_reply_counts() {
        let reply = CommentWithAuthor {
            comment: comment(),
            username: "carver".into(),
            user_reputation: 1.5,
            reply_count: 3,
        }
        .into_reply();
        assert_eq!(reply.reply_count, None);
        assert!(reply.replies.is_empty());
    }
}
