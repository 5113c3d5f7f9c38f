//! Project API handlers

use axum::{extract::State, http::StatusCode, Json};
use domains::{Pagination, Project, ProjectDetails, ProjectId, ProjectSearchFilters, ProjectUpdateRequest};
use serde::Deserialize;

use super::PageQuery;
use crate::{
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery, Caller},
    state::AppState,
};

/// `GET /projects/search` parameters. `title` matches a substring; tag
/// filters match one whole tag.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub title: Option<String>,
    pub style: Option<String>,
    pub environment: Option<String>,
    pub materials: Option<String>,
    pub tools: Option<String>,
    pub max_time_to_build: Option<i64>,
    pub min_rating: Option<f64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchQuery {
    fn into_filters(self) -> Result<ProjectSearchFilters, domains::ValidationError> {
        // Blank parameters (`?style=`) mean no filter.
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Ok(ProjectSearchFilters {
            page: Pagination::new(self.limit, self.offset)?,
            title: present(self.title),
            style: present(self.style),
            environment: present(self.environment),
            materials: present(self.materials),
            tools: present(self.tools),
            max_time_to_build: self.max_time_to_build,
            min_rating: self.min_rating,
        })
    }
}

pub async fn create_project(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(details): ApiJson<ProjectDetails>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state.services.projects.create_project(caller, details).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list_projects(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state
        .services
        .projects
        .list_projects(query.pagination()?)
        .await?;
    Ok(Json(projects))
}

pub async fn search_projects(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state
        .services
        .projects
        .search_projects(query.into_filters()?)
        .await?;
    Ok(Json(projects))
}

pub async fn popular_projects(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state
        .services
        .projects
        .get_popular_projects(query.pagination()?)
        .await?;
    Ok(Json(projects))
}

pub async fn recent_projects(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state
        .services
        .projects
        .get_recent_projects(query.pagination()?)
        .await?;
    Ok(Json(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProjectId>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.services.projects.get_project(id).await?))
}

pub async fn update_project(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<ProjectId>,
    ApiJson(req): ApiJson<ProjectUpdateRequest>,
) -> ApiResult<Json<Project>> {
    let project = state
        .services
        .projects
        .update_project(caller, id, req)
        .await?;
    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<ProjectId>,
) -> ApiResult<StatusCode> {
    state.services.projects.delete_project(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
