//! HTTP round trips through the full router on a real store.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use integration_tests::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn signup_publish_and_rate_over_http() {
    let test_app = TestApp::new().await;
    let app = test_app.router();

    let (status, u1) = call(
        &app,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({"username": "oak_lover", "email": "A@B.co", "firebase_uid": "fu1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(u1["email"], "a@b.co");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({"username": "copycat", "email": "a@b.co", "firebase_uid": "fu9"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    call(
        &app,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({"username": "walnut_fan", "email": "c@d.co", "firebase_uid": "fu2"})),
    )
    .await;

    let (status, project) = call(
        &app,
        Method::POST,
        "/api/v1/projects",
        Some("fu1"),
        Some(json!({"title": "Oak Table", "style": ["shaker"], "time_to_build": 600})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = project["id"].as_i64().unwrap();
    assert_eq!(project["rating_count"], 0);

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/v1/projects/{id}/ratings"),
        Some("fu2"),
        Some(json!({"value": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, project) = call(&app, Method::GET, &format!("/api/v1/projects/{id}"), None, None).await;
    assert_eq!(project["average_rating"], 5.0);
    assert_eq!(project["rating_count"], 1);

    let (status, mine) = call(
        &app,
        Method::GET,
        &format!("/api/v1/projects/{id}/ratings/me"),
        Some("fu2"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["value"], 5);

    let (_, stats) = call(
        &app,
        Method::GET,
        &format!("/api/v1/projects/{id}/ratings/stats"),
        None,
        None,
    )
    .await;
    assert_eq!(stats["total_ratings"], 1);
    assert_eq!(stats["distribution"]["5"], 1);

    let (_, found) = call(&app, Method::GET, "/api/v1/projects/search?style=shaker", None, None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (_, popular) = call(&app, Method::GET, "/api/v1/projects/popular", None, None).await;
    assert_eq!(popular[0]["id"], id);

    let u1_id = u1["id"].as_i64().unwrap();
    let (_, reputation) = call(
        &app,
        Method::GET,
        &format!("/api/v1/users/{u1_id}/reputation"),
        None,
        None,
    )
    .await;
    assert_eq!(reputation["reputation"], 0.5);

    let (status, by_uid) = call(&app, Method::GET, "/api/v1/users/uid/fu2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_uid["username"], "walnut_fan");
}

#[tokio::test]
async fn comments_and_replies_over_http() {
    let test_app = TestApp::new().await;
    let app = test_app.router();
    let author = test_app.user("carver").await;
    let fan = test_app.user("admirer").await;
    let project = test_app.project(&author, "Walnut Bench").await;
    let author_token = author.firebase_uid.clone();
    let fan_token = fan.firebase_uid.clone();

    let (status, comment) = call(
        &app,
        Method::POST,
        &format!("/api/v1/projects/{}/comments", project.id),
        Some(&fan_token),
        Some(json!({"content": "  Lovely joinery  ", "rating": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["content"], "Lovely joinery");
    let comment_id = comment["id"].as_i64().unwrap();

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/v1/comments/{comment_id}/reply"),
        Some(&author_token),
        Some(json!({"project_id": project.id, "content": "Thanks!"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, listed) = call(
        &app,
        Method::GET,
        &format!("/api/v1/projects/{}/comments", project.id),
        None,
        None,
    )
    .await;
    assert_eq!(listed[0]["reply_count"], 1);
    assert_eq!(listed[0]["replies"][0]["content"], "Thanks!");
    assert_eq!(listed[0]["username"], "admirer");

    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/api/v1/comments/{comment_id}"),
        Some(&author_token),
        Some(json!({"content": "hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/v1/comments/{comment_id}"),
        Some(&fan_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, replies) = call(
        &app,
        Method::GET,
        &format!("/api/v1/comments/{comment_id}/replies"),
        None,
        None,
    )
    .await;
    assert_eq!(replies.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn private_lists_over_http() {
    let test_app = TestApp::new().await;
    let app = test_app.router();
    let owner = test_app.user("carver").await;
    let stranger = test_app.user("stranger").await;
    let project = test_app.project(&owner, "Cherry Cabinet").await;

    let (status, list) = call(
        &app,
        Method::POST,
        "/api/v1/project-lists",
        Some(&owner.firebase_uid),
        Some(json!({"name": "Favorites"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(list["is_public"], false);
    let list_id = list["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/v1/project-lists/{list_id}"),
        Some(&stranger.firebase_uid),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized");

    let add = json!({"project_id": project.id});
    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/v1/project-lists/{list_id}/projects"),
        Some(&owner.firebase_uid),
        Some(add.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/v1/project-lists/{list_id}/projects"),
        Some(&owner.firebase_uid),
        Some(add.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, membership) = call(
        &app,
        Method::GET,
        &format!("/api/v1/project-lists/{list_id}/projects/{}", project.id),
        Some(&owner.firebase_uid),
        None,
    )
    .await;
    assert_eq!(membership["in_list"], true);

    let (_, own_lists) = call(
        &app,
        Method::GET,
        &format!("/api/v1/users/{}/project-lists", owner.id),
        None,
        None,
    )
    .await;
    assert!(own_lists.as_array().unwrap().is_empty());

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/v1/project-lists/{list_id}"),
        Some(&owner.firebase_uid),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/v1/project-lists/{list_id}/projects"),
        Some(&owner.firebase_uid),
        Some(add),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_and_unauthenticated_writes() {
    let test_app = TestApp::new().await;
    let app = test_app.router();

    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/project-lists",
        Some("nobody"),
        Some(json!({"name": "Favorites"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");

    let (status, body) = call(&app, Method::GET, "/api/v1/users/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "user with id 999 not found");
}

#[tokio::test]
async fn user_responses_never_expose_the_identity_token() {
    let test_app = TestApp::new().await;
    let app = test_app.router();

    let (status, created) = call(
        &app,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({"username": "quiet_one", "email": "q@w.co", "firebase_uid": "fu-quiet"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created.get("firebase_uid").is_none());
    let id = created["id"].as_i64().unwrap();

    let (_, listed) = call(&app, Method::GET, "/api/v1/users", None, None).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed.iter().all(|u| u.get("firebase_uid").is_none()));

    let (_, single) = call(&app, Method::GET, &format!("/api/v1/users/{id}"), None, None).await;
    assert!(single.get("firebase_uid").is_none());

    let (status, by_uid) = call(&app, Method::GET, "/api/v1/users/uid/fu-quiet", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(by_uid.get("firebase_uid").is_none());

    let (_, updated) = call(
        &app,
        Method::PUT,
        &format!("/api/v1/users/{id}"),
        Some("fu-quiet"),
        Some(json!({"username": "still_quiet"})),
    )
    .await;
    assert_eq!(updated["username"], "still_quiet");
    assert!(updated.get("firebase_uid").is_none());
}
