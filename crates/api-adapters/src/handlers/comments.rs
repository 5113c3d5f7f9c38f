//! Comment API handlers

use axum::{extract::State, http::StatusCode, Json};
use domains::{
    Comment, CommentCreateRequest, CommentId, CommentResponse, CommentUpdateRequest, ProjectId,
};
use serde::Deserialize;

use crate::{
    error::ApiResult,
    extract::{ApiJson, ApiPath, Caller},
    state::AppState,
};

/// Body of `POST /projects/{id}/comments`; the project comes from the path.
#[derive(Debug, Deserialize)]
pub struct NewCommentBody {
    pub content: String,
    #[serde(default)]
    pub rating: Option<i32>,
}

/// Top-level comments, newest first, each with its replies oldest first.
pub async fn get_project_comments(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<ProjectId>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    let comments = state
        .services
        .comments
        .get_project_comments(project_id)
        .await?;
    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(project_id): ApiPath<ProjectId>,
    ApiJson(body): ApiJson<NewCommentBody>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let req = CommentCreateRequest {
        project_id,
        content: body.content,
        rating: body.rating,
    };
    let comment = state.services.comments.create_comment(caller, req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn create_reply(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(parent_id): ApiPath<CommentId>,
    ApiJson(req): ApiJson<CommentCreateRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let reply = state
        .services
        .comments
        .create_reply(caller, parent_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn get_comment_replies(
    State(state): State<AppState>,
    ApiPath(parent_id): ApiPath<CommentId>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    let replies = state
        .services
        .comments
        .get_comment_replies(parent_id)
        .await?;
    Ok(Json(replies))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<CommentId>,
    ApiJson(req): ApiJson<CommentUpdateRequest>,
) -> ApiResult<Json<Comment>> {
    let comment = state
        .services
        .comments
        .update_comment(caller, id, req)
        .await?;
    Ok(Json(comment))
}

/// Soft delete; the comment stays in place as a tombstone.
pub async fn delete_comment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<CommentId>,
) -> ApiResult<StatusCode> {
    state.services.comments.delete_comment(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
