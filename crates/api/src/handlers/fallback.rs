//! Responses for requests no `/api/v1` handler claims, kept in the envelope.

use axum::http::StatusCode;

use crate::response::ApiResponse;

/// Any unmatched path under `/api/v1`.
pub async fn not_found() -> ApiResponse<()> {
    ApiResponse::empty(StatusCode::NOT_FOUND, "Route not found")
}

/// A known path requested with a method it does not serve.
pub async fn method_not_allowed() -> ApiResponse<()> {
    ApiResponse::empty(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
