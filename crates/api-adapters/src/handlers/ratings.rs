//! Rating API handlers. A caller has at most one rating per project, so the
//! project id alone addresses it.

use axum::{extract::State, http::StatusCode, Json};
use domains::{
    ProjectId, Rating, RatingCreateRequest, RatingResponse, RatingStats, RatingUpdateRequest,
};
use serde::Deserialize;

use crate::{
    error::ApiResult,
    extract::{ApiJson, ApiPath, Caller},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct NewRatingBody {
    pub value: i32,
}

pub async fn get_project_ratings(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<ProjectId>,
) -> ApiResult<Json<Vec<RatingResponse>>> {
    let ratings = state
        .services
        .ratings
        .get_project_ratings(project_id)
        .await?;
    Ok(Json(ratings))
}

pub async fn create_rating(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(project_id): ApiPath<ProjectId>,
    ApiJson(body): ApiJson<NewRatingBody>,
) -> ApiResult<(StatusCode, Json<Rating>)> {
    let req = RatingCreateRequest {
        project_id,
        value: body.value,
    };
    let rating = state.services.ratings.create_rating(caller, req).await?;
    Ok((StatusCode::CREATED, Json(rating)))
}

pub async fn update_rating(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(project_id): ApiPath<ProjectId>,
    ApiJson(req): ApiJson<RatingUpdateRequest>,
) -> ApiResult<Json<Rating>> {
    let rating = state
        .services
        .ratings
        .update_rating(caller, project_id, req)
        .await?;
    Ok(Json(rating))
}

pub async fn delete_rating(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(project_id): ApiPath<ProjectId>,
) -> ApiResult<StatusCode> {
    state
        .services
        .ratings
        .delete_rating(caller, project_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_rating_stats(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<ProjectId>,
) -> ApiResult<Json<RatingStats>> {
    let stats = state
        .services
        .ratings
        .get_project_rating_stats(project_id)
        .await?;
    Ok(Json(stats))
}

/// The caller's own rating of the project.
pub async fn get_my_rating(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiPath(project_id): ApiPath<ProjectId>,
) -> ApiResult<Json<Rating>> {
    let rating = state
        .services
        .ratings
        .get_user_rating(caller, project_id)
        .await?;
    Ok(Json(rating))
}
