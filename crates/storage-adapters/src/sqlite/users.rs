use async_trait::async_trait;
use chrono::Utc;
use domains::{AppError, NewUser, Pagination, Result, User, UserId, UserRepository};
use domains::Validate;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use super::error::map_sqlx_error;
use super::StoreResultExt;

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &SqliteRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        firebase_uid: row.try_get("firebase_uid")?,
        reputation: row.try_get("reputation")?,
        profile_picture: row.try_get("profile_picture")?,
    })
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        user.validate()?;
        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO users (created_at, updated_at, username, email, firebase_uid)
             VALUES (?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(now)
        .bind(now)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.firebase_uid)
        .fetch_one(&self.pool)
        .await
        .store_err("user")?;

        user_from_row(&row).store_err("user")
    }

    async fn get_by_id(&self, id: UserId) -> Result<User> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .store_err("user")?
            .ok_or_else(|| AppError::not_found("user", id))?;

        user_from_row(&row).store_err("user")
    }

    async fn get_by_email(&self, email: &str) -> Result<User> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .store_err("user")?
            .ok_or_else(|| AppError::NotFound(format!("user with email {email} not found")))?;

        user_from_row(&row).store_err("user")
    }

    async fn get_by_firebase_uid(&self, firebase_uid: &str) -> Result<User> {
        let row = sqlx::query("SELECT * FROM users WHERE firebase_uid = ?")
            .bind(firebase_uid)
            .fetch_optional(&self.pool)
            .await
            .store_err("user")?
            .ok_or_else(|| {
                AppError::NotFound(format!("user with firebase_uid {firebase_uid} not found"))
            })?;

        user_from_row(&row).store_err("user")
    }

    async fn update(&self, user: &User) -> Result<User> {
        user.validate()?;
        let row = sqlx::query(
            "UPDATE users
             SET username = ?, reputation = ?, profile_picture = ?, updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&user.username)
        .bind(user.reputation)
        .bind(user.profile_picture)
        .bind(Utc::now())
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await
        .store_err("user")?
        .ok_or_else(|| AppError::not_found("user", user.id))?;

        user_from_row(&row).store_err("user")
    }

    async fn delete(&self, id: UserId) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::Conflict(format!("user {id} still owns content"))
                }
                other => map_sqlx_error(other, "user"),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("user", id));
        }
        Ok(())
    }

    async fn list(&self, page: Pagination) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?")
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .store_err("user")?;

        rows.iter()
            .map(user_from_row)
            .collect::<std::result::Result<_, _>>()
            .store_err("user")
    }
}
