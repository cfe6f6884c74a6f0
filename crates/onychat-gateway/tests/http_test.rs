//! Router-level tests for the HTTP surface: profiles, /api/me, /ws
//! pre-upgrade checks and /health.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use onychat_core::config::OnychatConfig;
use onychat_gateway::{
    app::{self, AppState},
    auth::HmacTokenVerifier,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const SECRET: &str = "http-test-secret";

fn test_app() -> Router {
    let users_db = rusqlite::Connection::open_in_memory().unwrap();
    onychat_users::db::init_db(&users_db).unwrap();
    let log_db = rusqlite::Connection::open_in_memory().unwrap();
    onychat_messages::db::init_db(&log_db).unwrap();

    let config = OnychatConfig::default();
    let (hub, _task) = app::spawn_hub(config.hub, Arc::new(onychat_messages::MessageLog::new(log_db)));
    let state = Arc::new(AppState::new(
        config,
        hub,
        onychat_users::ProfileStore::new(users_db),
        Arc::new(HmacTokenVerifier::new(SECRET)),
    ));
    app::build_router(state)
}

fn token(identity: &str) -> String {
    HmacTokenVerifier::new(SECRET)
        .issue(identity, Duration::from_secs(60))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn post_user(body: Value) -> Request<Body> {
    Request::post("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn create_user_returns_profile() {
    let app = test_app();
    let (status, body) = send(
        &app,
        post_user(json!({"id": "u-1", "email": "ada@example.com", "displayName": "Ada"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "u-1");
    assert_eq!(body["displayName"], "Ada");
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn duplicate_user_is_conflict() {
    let app = test_app();
    let req = || post_user(json!({"id": "u-1", "email": "ada@example.com"}));
    assert_eq!(send(&app, req()).await.0, StatusCode::OK);
    let (status, body) = send(&app, req()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "USER_EXISTS");
}

#[tokio::test]
async fn bad_user_body_is_bad_request() {
    let app = test_app();
    let (status, _) = send(&app, post_user(json!({"email": "no-id@example.com"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, post_user(json!({"id": " ", "email": "a@example.com"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn me_requires_bearer_token() {
    let app = test_app();
    let (status, body) = send(&app, Request::get("/api/me").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTH_FAILED");

    let req = Request::get("/api/me")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_echoes_uid() {
    let app = test_app();
    let req = Request::get("/api/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token("u-9")))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uid"], "u-9");
    assert_eq!(body["message"], "Welcome, authenticated user!");
}

#[tokio::test]
async fn ws_without_token_is_unauthorized() {
    let app = test_app();
    let (status, _) = send(&app, Request::get("/ws").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Request::get("/ws?token=").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Request::get("/ws?token=forged.1.00").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ws_for_unknown_profile_is_not_found() {
    let app = test_app();
    let uri = format!("/ws?token={}", token("ghost"));
    let (status, body) = send(&app, Request::get(uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn ws_with_valid_profile_but_no_upgrade_is_rejected_by_upgrade() {
    let app = test_app();
    send(&app, post_user(json!({"id": "u-1", "email": "ada@example.com"}))).await;
    let uri = format!("/ws?token={}", token("u-1"));
    let (status, _) = send(&app, Request::get(uri).body(Body::empty()).unwrap()).await;
    assert!(status.is_client_error());
    assert_ne!(status, StatusCode::UNAUTHORIZED);
    assert_ne!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_members() {
    let app = test_app();
    let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["members"], 0);
    assert!(body["version"].is_string());
}
