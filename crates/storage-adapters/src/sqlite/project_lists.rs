use async_trait::async_trait;
use chrono::Utc;
use domains::{
    AppError, ListedProject, NewProjectList, NewProjectListItem, Pagination, ProjectId,
    ProjectList, ProjectListId, ProjectListItem, ProjectListRepository, ProjectListResponse,
    Result, UserId,
};
use domains::Validate;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::debug;

use super::error::map_sqlx_error;
use super::StoreResultExt;

pub struct SqliteProjectListRepository {
    pool: SqlitePool,
}

impl SqliteProjectListRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn list_from_row(row: &SqliteRow) -> std::result::Result<ProjectList, sqlx::Error> {
    Ok(ProjectList {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        is_public: row.try_get("is_public")?,
    })
}

fn counted_from_row(row: &SqliteRow) -> std::result::Result<ProjectListResponse, sqlx::Error> {
    Ok(ProjectListResponse {
        list: list_from_row(row)?,
        project_count: row.try_get("project_count")?,
        projects: Vec::new(),
    })
}

fn item_from_row(row: &SqliteRow) -> std::result::Result<ProjectListItem, sqlx::Error> {
    Ok(ProjectListItem {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        project_list_id: row.try_get("project_list_id")?,
        project_id: row.try_get("project_id")?,
    })
}

fn listed_from_row(row: &SqliteRow) -> std::result::Result<ListedProject, sqlx::Error> {
    Ok(ListedProject {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        portrait: row.try_get("portrait")?,
        average_rating: row.try_get("average_rating")?,
        rating_count: row.try_get("rating_count")?,
        added_at: row.try_get("added_at")?,
    })
}

const COUNTED_SELECT: &str = "
    SELECT l.*,
           (SELECT COUNT(*) FROM project_list_items i WHERE i.project_list_id = l.id) AS project_count
    FROM project_lists l";

#[async_trait]
impl ProjectListRepository for SqliteProjectListRepository {
    async fn create(&self, list: NewProjectList) -> Result<ProjectList> {
        list.validate()?;
        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO project_lists (created_at, updated_at, user_id, name, is_public)
             VALUES (?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(now)
        .bind(now)
        .bind(list.user_id)
        .bind(&list.name)
        .bind(list.is_public)
        .fetch_one(&self.pool)
        .await
        .store_err("project list")?;

        list_from_row(&row).store_err("project list")
    }

    async fn get_by_id(&self, id: ProjectListId) -> Result<ProjectList> {
        let row = sqlx::query("SELECT * FROM project_lists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .store_err("project list")?
            .ok_or_else(|| AppError::not_found("project list", id))?;

        list_from_row(&row).store_err("project list")
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<ProjectListResponse>> {
        let sql = format!("{COUNTED_SELECT} WHERE l.user_id = ? ORDER BY l.created_at DESC, l.id DESC");
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .store_err("project list")?;

        rows.iter()
            .map(counted_from_row)
            .collect::<std::result::Result<_, _>>()
            .store_err("project list")
    }

    async fn list_public(&self, page: Pagination) -> Result<Vec<ProjectListResponse>> {
        let sql = format!(
            "{COUNTED_SELECT} WHERE l.is_public = 1
             ORDER BY l.created_at DESC, l.id DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .store_err("project list")?;

        rows.iter()
            .map(counted_from_row)
            .collect::<std::result::Result<_, _>>()
            .store_err("project list")
    }

    async fn update(&self, list: &ProjectList) -> Result<ProjectList> {
        list.validate()?;
        let row = sqlx::query(
            "UPDATE project_lists SET name = ?, is_public = ?, updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&list.name)
        .bind(list.is_public)
        .bind(Utc::now())
        .bind(list.id)
        .fetch_optional(&self.pool)
        .await
        .store_err("project list")?
        .ok_or_else(|| AppError::not_found("project list", list.id))?;

        list_from_row(&row).store_err("project list")
    }

    /// Items first, then the list, in one transaction. Either both go or neither does.
    async fn delete(&self, id: ProjectListId) -> Result<()> {
        let mut tx = self.pool.begin().await.store_err("project list")?;

        let items = sqlx::query("DELETE FROM project_list_items WHERE project_list_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .store_err("project list item")?;

        let result = sqlx::query("DELETE FROM project_lists WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .store_err("project list")?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Err(AppError::not_found("project list", id));
        }

        tx.commit().await.store_err("project list")?;
        debug!(list_id = id, items = items.rows_affected(), "project list deleted");
        Ok(())
    }

    async fn add_project(&self, item: NewProjectListItem) -> Result<ProjectListItem> {
        item.validate()?;
        let row = sqlx::query(
            "INSERT INTO project_list_items (created_at, project_list_id, project_id)
             VALUES (?, ?, ?)
             RETURNING *",
        )
        .bind(Utc::now())
        .bind(item.project_list_id)
        .bind(item.project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(format!(
                "project {} is already in list {}",
                item.project_id, item.project_list_id
            )),
            other => map_sqlx_error(other, "project list item"),
        })?;

        item_from_row(&row).store_err("project list item")
    }

    async fn remove_project(&self, list_id: ProjectListId, project_id: ProjectId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM project_list_items WHERE project_list_id = ? AND project_id = ?",
        )
        .bind(list_id)
        .bind(project_id)
        .execute(&self.pool)
        .await
        .store_err("project list item")?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "project {project_id} not found in list {list_id}"
            )));
        }
        Ok(())
    }

    async fn get_with_projects(&self, id: ProjectListId) -> Result<ProjectListResponse> {
        let sql = format!("{COUNTED_SELECT} WHERE l.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .store_err("project list")?
            .ok_or_else(|| AppError::not_found("project list", id))?;
        let mut response = counted_from_row(&row).store_err("project list")?;

        let rows = sqlx::query(
            "SELECT p.id, p.title, p.portrait, p.average_rating, p.rating_count,
                    i.created_at AS added_at
             FROM project_list_items i
             JOIN projects p ON p.id = i.project_id
             WHERE i.project_list_id = ?
             ORDER BY i.created_at DESC, i.id DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .store_err("project list")?;

        response.projects = rows
            .iter()
            .map(listed_from_row)
            .collect::<std::result::Result<_, _>>()
            .store_err("project list")?;
        Ok(response)
    }

    async fn is_project_in_list(&self, list_id: ProjectListId, project_id: ProjectId) -> Result<bool> {
        let present: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM project_list_items WHERE project_list_id = ? AND project_id = ?)",
        )
        .bind(list_id)
        .bind(project_id)
        .fetch_one(&self.pool)
        .await
        .store_err("project list item")?;

        Ok(present)
    }
}
