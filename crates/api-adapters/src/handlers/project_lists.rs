//! Project list API handlers

use axum::{extract::State, http::StatusCode, Json};
use domains::{
    AddProjectRequest, ProjectId, ProjectList, ProjectListCreateRequest, ProjectListId,
    ProjectListItem, ProjectListResponse, ProjectListUpdateRequest,
};
use serde::Serialize;

use super::PageQuery;
use crate::{
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery, Caller, MaybeCaller},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub project_list_id: ProjectListId,
    pub project_id: ProjectId,
    pub in_list: bool,
}

pub async fn create_project_list(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<ProjectListCreateRequest>,
) -> ApiResult<(StatusCode, Json<ProjectList>)> {
    let list = state
        .services
        .project_lists
        .create_project_list(caller, req)
        .await?;
    Ok((StatusCode::CREATED, Json(list)))
}

pub async fn public_project_lists(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Vec<ProjectListResponse>>> {
    let lists = state
        .services
        .project_lists
        .get_public_project_lists(query.pagination()?)
        .await?;
    Ok(Json(lists))
}

pub async fn get_project_list(
    State(state): State<AppState>,
    MaybeCaller(viewer): MaybeCaller,
    ApiPath(id): ApiPath<ProjectListId>,
) -> ApiResult<Json<ProjectListResponse>> {
    let list = state
        .services
        .project_lists
        .get_project_list(viewer, id)
        .await?;
    Ok(Json(list))
}

pub async fn update_project_list(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<ProjectListId>,
    ApiJson(req): ApiJson<ProjectListUpdateRequest>,
) -> ApiResult<Json<ProjectList>> {
    let list = state
        .services
        .project_lists
        .update_project_list(caller, id, req)
        .await?;
    Ok(Json(list))
}

pub async fn delete_project_list(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<ProjectListId>,
) -> ApiResult<StatusCode> {
    state
        .services
        .project_lists
        .delete_project_list(caller, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_project(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(list_id): ApiPath<ProjectListId>,
    ApiJson(req): ApiJson<AddProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectListItem>)> {
    let item = state
        .services
        .project_lists
        .add_project_to_list(caller, list_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn remove_project(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath((list_id, project_id)): ApiPath<(ProjectListId, ProjectId)>,
) -> ApiResult<StatusCode> {
    state
        .services
        .project_lists
        .remove_project_from_list(caller, list_id, project_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn check_membership(
    State(state): State<AppState>,
    MaybeCaller(viewer): MaybeCaller,
    ApiPath((list_id, project_id)): ApiPath<(ProjectListId, ProjectId)>,
) -> ApiResult<Json<MembershipResponse>> {
    let in_list = state
        .services
        .project_lists
        .is_project_in_list(viewer, list_id, project_id)
        .await?;
    Ok(Json(MembershipResponse {
        project_list_id: list_id,
        project_id,
        in_list,
    }))
}
