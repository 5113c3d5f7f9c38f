use async_trait::async_trait;
use chrono::Utc;
use domains::{
    AppError, Comment, CommentBody, CommentId, CommentRepository, CommentWithAuthor, NewComment,
    Pagination, ProjectId, Result, UserId, COMMENT_TOMBSTONE,
};
use domains::Validate;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::StoreResultExt;

pub struct SqliteCommentRepository {
    pool: SqlitePool,
}

impl SqliteCommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// `is_deleted` decides the body; the stored text of a deleted row is the tombstone.
fn comment_from_row(row: &SqliteRow) -> std::result::Result<Comment, sqlx::Error> {
    let is_deleted: bool = row.try_get("is_deleted")?;
    let body = if is_deleted {
        CommentBody::Deleted
    } else {
        CommentBody::Active {
            content: row.try_get("content")?,
        }
    };

    Ok(Comment {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        project_id: row.try_get("project_id")?,
        user_id: row.try_get("user_id")?,
        body,
        rating: row.try_get("rating")?,
        parent_comment_id: row.try_get("parent_comment_id")?,
    })
}

fn annotated_from_row(row: &SqliteRow) -> std::result::Result<CommentWithAuthor, sqlx::Error> {
    Ok(CommentWithAuthor {
        comment: comment_from_row(row)?,
        username: row.try_get("username")?,
        user_reputation: row.try_get("user_reputation")?,
        reply_count: row.try_get("reply_count")?,
    })
}

const ANNOTATED_SELECT: &str = "
    SELECT c.*, u.username AS username, u.reputation AS user_reputation,
           (SELECT COUNT(*) FROM comments r
             WHERE r.parent_comment_id = c.id AND r.is_deleted = 0) AS reply_count
    FROM comments c
    JOIN users u ON u.id = c.user_id";

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn create(&self, comment: NewComment) -> Result<Comment> {
        comment.validate()?;
        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO comments (created_at, updated_at, project_id, user_id, content, rating, parent_comment_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(now)
        .bind(now)
        .bind(comment.project_id)
        .bind(comment.user_id)
        .bind(&comment.content)
        .bind(comment.rating)
        .bind(comment.parent_comment_id)
        .fetch_one(&self.pool)
        .await
        .store_err("comment")?;

        comment_from_row(&row).store_err("comment")
    }

    async fn get_by_id(&self, id: CommentId) -> Result<Comment> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .store_err("comment")?
            .ok_or_else(|| AppError::not_found("comment", id))?;

        comment_from_row(&row).store_err("comment")
    }

    async fn list_top_level(&self, project_id: ProjectId) -> Result<Vec<CommentWithAuthor>> {
        let sql = format!(
            "{ANNOTATED_SELECT}
             WHERE c.project_id = ? AND c.parent_comment_id IS NULL AND c.is_deleted = 0
             ORDER BY c.created_at DESC, c.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
            .store_err("comment")?;

        rows.iter()
            .map(annotated_from_row)
            .collect::<std::result::Result<_, _>>()
            .store_err("comment")
    }

    async fn list_replies(&self, parent_id: CommentId) -> Result<Vec<CommentWithAuthor>> {
        let sql = format!(
            "{ANNOTATED_SELECT}
             WHERE c.parent_comment_id = ? AND c.is_deleted = 0
             ORDER BY c.created_at ASC, c.id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .store_err("comment")?;

        rows.iter()
            .map(annotated_from_row)
            .collect::<std::result::Result<_, _>>()
            .store_err("comment")
    }

    async fn list_by_user(&self, user_id: UserId, page: Pagination) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT * FROM comments WHERE user_id = ? AND is_deleted = 0
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .store_err("comment")?;

        rows.iter()
            .map(comment_from_row)
            .collect::<std::result::Result<_, _>>()
            .store_err("comment")
    }

    /// Only live comments can be updated; a deleted row reads as missing.
    async fn update(&self, comment: &Comment) -> Result<Comment> {
        comment.validate()?;
        let CommentBody::Active { content } = &comment.body else {
            return Err(AppError::not_found("comment", comment.id));
        };
        let row = sqlx::query(
            "UPDATE comments SET content = ?, rating = ?, updated_at = ?
             WHERE id = ? AND is_deleted = 0
             RETURNING *",
        )
        .bind(content)
        .bind(comment.rating)
        .bind(Utc::now())
        .bind(comment.id)
        .fetch_optional(&self.pool)
        .await
        .store_err("comment")?
        .ok_or_else(|| AppError::not_found("comment", comment.id))?;

        comment_from_row(&row).store_err("comment")
    }

    async fn soft_delete(&self, id: CommentId) -> Result<Comment> {
        let row = sqlx::query(
            "UPDATE comments SET is_deleted = 1, content = ?, updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(COMMENT_TOMBSTONE)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .store_err("comment")?
        .ok_or_else(|| AppError::not_found("comment", id))?;

        comment_from_row(&row).store_err("comment")
    }
}
