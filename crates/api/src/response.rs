//! Shared response envelope for API handlers.
//!
//! Every `/api/v1` response, success or failure, is wrapped in
//! `{ "error": bool, "message": string, "statusCode": int, "data": T | null }`.
//! Use [`ApiResponse`] instead of ad-hoc `serde_json::json!` bodies so the
//! envelope stays consistent.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Standard response envelope.
///
/// The HTTP status of the response always equals `status_code`.
///
/// # Example
///
/// ```ignore
/// Ok(ApiResponse::ok("User notes retrieved successfully", notes))
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub error: bool,
    pub message: String,
    pub status_code: u16,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// A `200 OK` success carrying `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::success(StatusCode::OK, message, data)
    }

    /// A `201 Created` success carrying `data`.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::success(StatusCode::CREATED, message, data)
    }

    pub fn success(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            error: false,
            message: message.into(),
            status_code: status.as_u16(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A response with `data: null`.
    pub fn empty(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: status.is_client_error() || status.is_server_error(),
            message: message.into(),
            status_code: status.as_u16(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
