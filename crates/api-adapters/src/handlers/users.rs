//! User API handlers

use axum::{extract::State, http::StatusCode, Json};
use domains::{
    Comment, Project, ProjectListResponse, Rating, User, UserCreateRequest, UserId,
    UserUpdateRequest,
};
use serde::Serialize;

use super::PageQuery;
use crate::{
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery, Caller, MaybeCaller},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct ReputationResponse {
    pub user_id: UserId,
    pub reputation: f64,
}

/// Signup. The new user is identified by the external token in the body, so
/// no bearer credential is required.
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UserCreateRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.services.users.create_user(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Vec<User>>> {
    let users = state.services.users.list_users(query.pagination()?).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.services.users.get_user(id).await?))
}

pub async fn get_user_by_firebase_uid(
    State(state): State<AppState>,
    ApiPath(uid): ApiPath<String>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.services.users.get_user_by_firebase_uid(&uid).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(req): ApiJson<UserUpdateRequest>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.services.users.update_user(caller, id, req).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<StatusCode> {
    state.services.users.delete_user(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_user_projects(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state
        .services
        .users
        .get_user_projects(id, query.pagination()?)
        .await?;
    Ok(Json(projects))
}

/// Private lists are only included when the viewer owns them.
pub async fn get_user_project_lists(
    State(state): State<AppState>,
    MaybeCaller(viewer): MaybeCaller,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<Json<Vec<ProjectListResponse>>> {
    let lists = state
        .services
        .project_lists
        .get_user_project_lists(viewer, id)
        .await?;
    Ok(Json(lists))
}

pub async fn get_user_comments(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = state
        .services
        .comments
        .get_user_comments(id, query.pagination()?)
        .await?;
    Ok(Json(comments))
}

pub async fn get_user_ratings(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Vec<Rating>>> {
    let ratings = state
        .services
        .ratings
        .get_user_ratings(id, query.pagination()?)
        .await?;
    Ok(Json(ratings))
}

pub async fn get_user_reputation(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<Json<ReputationResponse>> {
    let reputation = state.services.users.calculate_reputation(id).await?;
    Ok(Json(ReputationResponse {
        user_id: id,
        reputation,
    }))
}
