#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use fundmate_api::auth::jwt::JwtConfig;
use fundmate_api::config::{IngestConfig, IngestMode, ServerConfig};
use fundmate_api::router::build_app_router;
use fundmate_api::state::AppState;
use fundmate_classifier::mock::MockClassifier;

/// Build a test `ServerConfig` with safe defaults: a fixed JWT secret,
/// synchronous ingestion, and the dev CORS origin.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 604_800,
        },
        ingest: IngestConfig {
            mode: IngestMode::Sync,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and a scripted [`MockClassifier`].
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses. The returned
/// classifier handle lets tests script extraction outcomes before posting
/// messages.
pub fn build_test_app(pool: PgPool) -> (Router, Arc<MockClassifier>) {
    let config = test_config();
    let classifier = Arc::new(MockClassifier::new());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        classifier: classifier.clone(),
    };

    (build_app_router(state, &config), classifier)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request build should succeed"),
        None => builder
            .body(Body::empty())
            .expect("request build should succeed"),
    };
    app.clone()
        .oneshot(request)
        .await
        .expect("request should complete")
}

pub async fn get(app: &Router, path: &str) -> Response<Body> {
    send(app, Method::GET, path, None, None).await
}

pub async fn get_auth(app: &Router, path: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, path, Some(token), None).await
}

pub async fn post_json(app: &Router, path: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, path, None, Some(body)).await
}

pub async fn post_json_auth(
    app: &Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, path, Some(token), Some(body)).await
}

pub async fn post_auth(app: &Router, path: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, path, Some(token), None).await
}

pub async fn patch_json_auth(
    app: &Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, path, Some(token), Some(body)).await
}

pub async fn delete_auth(app: &Router, path: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, path, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

// ---------------------------------------------------------------------------
// Fixture helpers
// ---------------------------------------------------------------------------

pub const TEST_PASSWORD: &str = "test_password_123!";

/// Register a user via the API and return `(access_token, user_id)`.
pub async fn register(app: &Router, email: &str, display_name: &str) -> (String, i64) {
    let body = serde_json::json!({
        "email": email,
        "display_name": display_name,
        "password": TEST_PASSWORD,
    });
    let response = post_json(app, "/api/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let token = json["data"]["access_token"]
        .as_str()
        .expect("access_token must be a string")
        .to_string();
    let user_id = json["data"]["user"]["id"]
        .as_i64()
        .expect("user id must be a number");
    (token, user_id)
}

/// Create a fund via the API and return the fund JSON object.
pub async fn create_fund(app: &Router, token: &str, name: &str) -> serde_json::Value {
    let body = serde_json::json!({ "name": name });
    let response = post_json_auth(app, "/api/funds", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
