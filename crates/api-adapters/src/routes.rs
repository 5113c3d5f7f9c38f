//! API route definitions

use axum::{
    body::Body,
    extract::Request,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use domains::AppError;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info_span;

use crate::{
    error::ApiError,
    handlers::{comments, health, project_lists, projects, ratings, users},
    middleware::{cors_policy, rate_limit, security_headers, track_metrics},
    state::AppState,
};

fn api_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/uid/{uid}", get(users::get_user_by_firebase_uid))
        .route("/users/{id}/projects", get(users::get_user_projects))
        .route("/users/{id}/project-lists", get(users::get_user_project_lists))
        .route("/users/{id}/comments", get(users::get_user_comments))
        .route("/users/{id}/ratings", get(users::get_user_ratings))
        .route("/users/{id}/reputation", get(users::get_user_reputation))
        // Projects
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/projects/search", get(projects::search_projects))
        .route("/projects/popular", get(projects::popular_projects))
        .route("/projects/recent", get(projects::recent_projects))
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        // Comments
        .route(
            "/projects/{id}/comments",
            get(comments::get_project_comments).post(comments::create_comment),
        )
        .route(
            "/comments/{id}",
            axum::routing::put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/comments/{id}/replies", get(comments::get_comment_replies))
        .route("/comments/{id}/reply", axum::routing::post(comments::create_reply))
        // Ratings
        .route(
            "/projects/{id}/ratings",
            get(ratings::get_project_ratings)
                .post(ratings::create_rating)
                .put(ratings::update_rating)
                .delete(ratings::delete_rating),
        )
        .route("/projects/{id}/ratings/stats", get(ratings::get_rating_stats))
        .route("/projects/{id}/ratings/me", get(ratings::get_my_rating))
        // Project lists
        .route(
            "/project-lists",
            get(project_lists::public_project_lists).post(project_lists::create_project_list),
        )
        .route(
            "/project-lists/{id}",
            get(project_lists::get_project_list)
                .put(project_lists::update_project_list)
                .delete(project_lists::delete_project_list),
        )
        .route(
            "/project-lists/{id}/projects",
            axum::routing::post(project_lists::add_project),
        )
        .route(
            "/project-lists/{id}/projects/{project_id}",
            get(project_lists::check_membership).delete(project_lists::remove_project),
        )
}

async fn route_not_found() -> ApiError {
    AppError::NotFound("route not found".into()).into()
}

/// The full application: `/api/v1`, `/health`, `/metrics` and the middleware stack.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .nest("/api/v1", api_routes())
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .fallback(route_not_found)
        .layer(from_fn_with_state(state.clone(), rate_limit))
        .layer(cors_policy());
    for layer in security_headers() {
        app = app.layer(layer);
    }

    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    let request_id = req
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    info_span!(
                        "http",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id = %request_id,
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(from_fn_with_state(state.clone(), track_metrics)),
    )
    .with_state(state)
}
