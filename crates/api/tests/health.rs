//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, send};
use tower::ServiceExt;

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = common::build_test_app();
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["backend"], "memory");
    assert_eq!(json["storeHealthy"], true);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app();
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app();
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header should be present");
    assert!(!request_id.is_empty());
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let app = common::build_test_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/notes")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn unknown_api_route_is_404_in_the_envelope() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/nope").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], true);
    assert_eq!(json["statusCode"], 404);
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn unsupported_method_is_405_in_the_envelope() {
    let app = common::build_test_app();

    for (method, uri) in [
        (Method::PATCH, "/api/v1/notes"),
        (Method::GET, "/api/v1/notes/id/1"),
        (Method::DELETE, "/api/v1/auth"),
    ] {
        let response = send(app.clone(), method, uri, None, None).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        let json = body_json(response).await;
        assert_eq!(json["error"], true);
        assert_eq!(json["statusCode"], 405);
    }
}
