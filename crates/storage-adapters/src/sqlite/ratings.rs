use async_trait::async_trait;
use chrono::Utc;
use domains::{
    AppError, NewRating, Pagination, ProjectId, Rating, RatingId, RatingRepository,
    RatingResponse, RatingStats, Result, UserId,
};
use domains::Validate;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::error::map_sqlx_error;
use super::StoreResultExt;

pub struct SqliteRatingRepository {
    pool: SqlitePool,
}

impl SqliteRatingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn rating_from_row(row: &SqliteRow) -> std::result::Result<Rating, sqlx::Error> {
    Ok(Rating {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        value: row.try_get("value")?,
        user_id: row.try_get("user_id")?,
        project_id: row.try_get("project_id")?,
    })
}

#[async_trait]
impl RatingRepository for SqliteRatingRepository {
    async fn create(&self, rating: NewRating) -> Result<Rating> {
        rating.validate()?;
        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO ratings (created_at, updated_at, value, user_id, project_id)
             VALUES (?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(now)
        .bind(now)
        .bind(rating.value)
        .bind(rating.user_id)
        .bind(rating.project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("user has already rated this project".into())
            }
            other => map_sqlx_error(other, "rating"),
        })?;

        rating_from_row(&row).store_err("rating")
    }

    async fn get_by_id(&self, id: RatingId) -> Result<Rating> {
        let row = sqlx::query("SELECT * FROM ratings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .store_err("rating")?
            .ok_or_else(|| AppError::not_found("rating", id))?;

        rating_from_row(&row).store_err("rating")
    }

    async fn get_by_user_and_project(&self, user_id: UserId, project_id: ProjectId) -> Result<Rating> {
        let row = sqlx::query("SELECT * FROM ratings WHERE user_id = ? AND project_id = ?")
            .bind(user_id)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await
            .store_err("rating")?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "rating by user {user_id} for project {project_id} not found"
                ))
            })?;

        rating_from_row(&row).store_err("rating")
    }

    async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<RatingResponse>> {
        let rows = sqlx::query(
            "SELECT r.*, u.username AS username
             FROM ratings r JOIN users u ON u.id = r.user_id
             WHERE r.project_id = ?
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .store_err("rating")?;

        rows.iter()
            .map(|row| -> std::result::Result<RatingResponse, sqlx::Error> {
                Ok(RatingResponse {
                    rating: rating_from_row(row)?,
                    username: row.try_get("username")?,
                })
            })
            .collect::<std::result::Result<_, _>>()
            .store_err("rating")
    }

    async fn list_by_user(&self, user_id: UserId, page: Pagination) -> Result<Vec<Rating>> {
        let rows = sqlx::query(
            "SELECT * FROM ratings WHERE user_id = ?
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .store_err("rating")?;

        rows.iter()
            .map(rating_from_row)
            .collect::<std::result::Result<_, _>>()
            .store_err("rating")
    }

    async fn update(&self, rating: &Rating) -> Result<Rating> {
        rating.validate()?;
        let row = sqlx::query(
            "UPDATE ratings SET value = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(rating.value)
        .bind(Utc::now())
        .bind(rating.id)
        .fetch_optional(&self.pool)
        .await
        .store_err("rating")?
        .ok_or_else(|| AppError::not_found("rating", rating.id))?;

        rating_from_row(&row).store_err("rating")
    }

    async fn delete(&self, id: RatingId) -> Result<()> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .store_err("rating")?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("rating", id));
        }
        Ok(())
    }

    async fn get_project_stats(&self, project_id: ProjectId) -> Result<RatingStats> {
        let counts: Vec<(i32, i64)> = sqlx::query_as(
            "SELECT value, COUNT(*) FROM ratings WHERE project_id = ? GROUP BY value",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .store_err("rating")?;

        Ok(RatingStats::from_counts(project_id, counts))
    }
}
