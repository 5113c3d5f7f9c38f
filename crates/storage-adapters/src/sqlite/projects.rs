use async_trait::async_trait;
use chrono::Utc;
use domains::{
    AppError, NewProject, Pagination, Project, ProjectDetails, ProjectId, ProjectRepository,
    ProjectSearchFilters, RatingAggregate, Result, UserId,
};
use domains::Validate;
use sqlx::sqlite::{Sqlite, SqlitePool, SqliteRow};
use sqlx::{QueryBuilder, Row};

use super::{decode_json, encode_json, StoreResultExt};

pub struct SqliteProjectRepository {
    pool: SqlitePool,
}

impl SqliteProjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_page(&self, sql: &str, bind: Option<i64>, page: Pagination) -> Result<Vec<Project>> {
        let mut query = sqlx::query(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .store_err("project")?;
        projects_from_rows(&rows)
    }
}

fn project_from_row(row: &SqliteRow) -> std::result::Result<Project, sqlx::Error> {
    Ok(Project {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        owner: row.try_get("owner")?,
        details: ProjectDetails {
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            tutorial: row.try_get("tutorial")?,
            materials: decode_json(row.try_get("materials")?)?,
            tools: decode_json(row.try_get("tools")?)?,
            style: decode_json(row.try_get("style")?)?,
            environment: decode_json(row.try_get("environment")?)?,
            portrait: row.try_get("portrait")?,
            images: decode_json(row.try_get("images")?)?,
            time_to_build: row.try_get("time_to_build")?,
        },
        average_rating: row.try_get("average_rating")?,
        rating_count: row.try_get("rating_count")?,
    })
}

fn projects_from_rows(rows: &[SqliteRow]) -> Result<Vec<Project>> {
    rows.iter()
        .map(project_from_row)
        .collect::<std::result::Result<_, _>>()
        .store_err("project")
}

/// Makes `%`, `_` and `\` match literally under `ESCAPE '\'`.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// JSON columns searched by set membership.
fn push_membership(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, value: &Option<String>) {
    if let Some(value) = value {
        qb.push(format!(
            " AND EXISTS (SELECT 1 FROM json_each(projects.{column}) WHERE json_each.value = "
        ));
        qb.push_bind(value.clone());
        qb.push(")");
    }
}

#[async_trait]
impl ProjectRepository for SqliteProjectRepository {
    async fn create(&self, project: NewProject) -> Result<Project> {
        project.validate()?;
        let now = Utc::now();
        let d = &project.details;
        let row = sqlx::query(
            "INSERT INTO projects (created_at, updated_at, owner, title, description, tutorial,
                                   materials, tools, style, environment, portrait, images, time_to_build)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(now)
        .bind(now)
        .bind(project.owner)
        .bind(&d.title)
        .bind(&d.description)
        .bind(&d.tutorial)
        .bind(encode_json(&d.materials)?)
        .bind(encode_json(&d.tools)?)
        .bind(encode_json(&d.style)?)
        .bind(encode_json(&d.environment)?)
        .bind(&d.portrait)
        .bind(encode_json(&d.images)?)
        .bind(d.time_to_build)
        .fetch_one(&self.pool)
        .await
        .store_err("project")?;

        project_from_row(&row).store_err("project")
    }

    async fn get_by_id(&self, id: ProjectId) -> Result<Project> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .store_err("project")?
            .ok_or_else(|| AppError::not_found("project", id))?;

        project_from_row(&row).store_err("project")
    }

    async fn get_by_owner(&self, owner: UserId, page: Pagination) -> Result<Vec<Project>> {
        self.fetch_page(
            "SELECT * FROM projects WHERE owner = ?
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            Some(owner),
            page,
        )
        .await
    }

    /// Writes the owner-editable fields only. The rating aggregate is left to
    /// [`refresh_rating_aggregate`](ProjectRepository::refresh_rating_aggregate).
    async fn update(&self, project: &Project) -> Result<Project> {
        project.validate()?;
        let d = &project.details;
        let row = sqlx::query(
            "UPDATE projects
             SET title = ?, description = ?, tutorial = ?, materials = ?, tools = ?, style = ?,
                 environment = ?, portrait = ?, images = ?, time_to_build = ?, updated_at = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&d.title)
        .bind(&d.description)
        .bind(&d.tutorial)
        .bind(encode_json(&d.materials)?)
        .bind(encode_json(&d.tools)?)
        .bind(encode_json(&d.style)?)
        .bind(encode_json(&d.environment)?)
        .bind(&d.portrait)
        .bind(encode_json(&d.images)?)
        .bind(d.time_to_build)
        .bind(Utc::now())
        .bind(project.id)
        .fetch_optional(&self.pool)
        .await
        .store_err("project")?
        .ok_or_else(|| AppError::not_found("project", project.id))?;

        project_from_row(&row).store_err("project")
    }

    async fn delete(&self, id: ProjectId) -> Result<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .store_err("project")?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("project", id));
        }
        Ok(())
    }

    async fn search(&self, filters: &ProjectSearchFilters) -> Result<Vec<Project>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM projects WHERE 1 = 1");

        if let Some(title) = &filters.title {
            qb.push(" AND LOWER(title) LIKE ");
            qb.push_bind(format!("%{}%", escape_like(&title.to_lowercase())));
            qb.push(r" ESCAPE '\'");
        }
        push_membership(&mut qb, "style", &filters.style);
        push_membership(&mut qb, "environment", &filters.environment);
        push_membership(&mut qb, "materials", &filters.materials);
        push_membership(&mut qb, "tools", &filters.tools);
        if let Some(max) = filters.max_time_to_build {
            qb.push(" AND time_to_build <= ");
            qb.push_bind(max);
        }
        if let Some(min) = filters.min_rating {
            qb.push(" AND average_rating >= ");
            qb.push_bind(min);
        }

        qb.push(" ORDER BY average_rating DESC, created_at DESC, id DESC LIMIT ");
        qb.push_bind(filters.page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(filters.page.offset());

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .store_err("project")?;
        projects_from_rows(&rows)
    }

    async fn list(&self, page: Pagination) -> Result<Vec<Project>> {
        self.fetch_page(
            "SELECT * FROM projects ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            None,
            page,
        )
        .await
    }

    async fn list_popular(&self, page: Pagination) -> Result<Vec<Project>> {
        self.fetch_page(
            "SELECT * FROM projects WHERE rating_count > 0
             ORDER BY average_rating DESC, rating_count DESC, created_at DESC, id DESC
             LIMIT ? OFFSET ?",
            None,
            page,
        )
        .await
    }

    /// A single statement, so concurrent rating writes cannot interleave
    /// between reading the ratings and storing the result.
    async fn refresh_rating_aggregate(&self, id: ProjectId) -> Result<RatingAggregate> {
        let row = sqlx::query(
            "UPDATE projects
             SET average_rating = COALESCE((SELECT AVG(value) FROM ratings WHERE project_id = ?1), 0.0),
                 rating_count   = (SELECT COUNT(*) FROM ratings WHERE project_id = ?1)
             WHERE id = ?1
             RETURNING average_rating, rating_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .store_err("project")?
        .ok_or_else(|| AppError::not_found("project", id))?;

        Ok(RatingAggregate {
            average_rating: row.try_get("average_rating").store_err("project")?,
            rating_count: row.try_get("rating_count").store_err("project")?,
        })
    }
}
