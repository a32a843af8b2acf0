//! Shared helpers for API integration tests.
//!
//! Every test gets a fresh in-memory app, so no database is needed.

#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use notekeep_api::config::{ServerConfig, StoreBackend};
use notekeep_api::router::build_app_router;
use notekeep_api::state::AppState;
use notekeep_core::authenticator::AuthConfig;
use notekeep_core::password::PasswordCost;
use notekeep_core::rate_limit::RateLimitConfig;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// Argon2 runs at its minimum cost so registration stays fast.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        backend: StoreBackend::Memory,
        sweep_interval_secs: 300,
        auth: AuthConfig {
            session_ttl: Duration::from_secs(3600),
            password_cost: PasswordCost {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
            },
        },
        rate_limit: RateLimitConfig::default(),
    }
}

/// Build the full application router over in-memory stores.
pub fn build_test_app() -> Router {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> Router {
    let state = AppState::in_memory(config.clone());
    build_app_router(state, &config)
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Send a request with an optional bearer token and JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

/// A logged-in user as seen by the client.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub token: String,
}

/// Authenticate (registering if needed) and return the session.
pub async fn login(app: &Router, username: &str, password: &str) -> Session {
    let body = serde_json::json!({ "username": username, "password": password });
    let response = post_json(app.clone(), "/api/v1/auth", body).await;
    assert!(
        response.status().is_success(),
        "login failed with {}",
        response.status()
    );
    let json = body_json(response).await;
    Session {
        user_id: json["data"]["userId"].as_i64().expect("userId"),
        token: json["data"]["sessionToken"]
            .as_str()
            .expect("sessionToken")
            .to_string(),
    }
}

/// `POST /api/v1/notes` on behalf of `session`.
pub async fn create_note(app: &Router, session: &Session, data: &str) -> Response<Body> {
    let body = serde_json::json!({ "userId": session.user_id, "data": data });
    send(
        app.clone(),
        Method::POST,
        "/api/v1/notes",
        Some(&session.token),
        Some(body),
    )
    .await
}

/// `GET /api/v1/notes` on behalf of `session`.
pub async fn list_notes(app: &Router, session: &Session) -> Response<Body> {
    let uri = format!("/api/v1/notes?userId={}", session.user_id);
    send(app.clone(), Method::GET, &uri, Some(&session.token), None).await
}
