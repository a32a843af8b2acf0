//! Handlers for the `/auth` resource (login-or-register, session check, logout).

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use notekeep_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::{bearer_token, SessionToken, SessionUser};
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth`.
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Session handed to the client after authentication.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user_id: DbId,
    /// Opaque token to send back as `Authorization: Bearer <token>`.
    pub session_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth
///
/// Log in with username + password, or register when the username is new.
/// Any session presented with the request is replaced by a fresh one.
/// Responds 201 on registration and 200 on login.
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> AppResult<ApiResponse<SessionInfo>> {
    let Json(input) = payload?;
    let previous = bearer_token(&headers);

    let outcome = state
        .authenticator
        .authenticate(&input.username, &input.password, previous.as_ref())
        .await?;

    let info = SessionInfo {
        user_id: outcome.user_id,
        session_token: outcome.session_id.into_inner(),
    };

    if outcome.registered {
        Ok(ApiResponse::created(
            "User registered and authenticated successfully",
            info,
        ))
    } else {
        Ok(ApiResponse::ok("Authentication successful", info))
    }
}

/// GET /api/v1/auth
///
/// Echo the caller's session, for clients that embed `userId`/`sessionId`
/// in note requests.
pub async fn current_session(session: SessionUser) -> AppResult<ApiResponse<SessionInfo>> {
    Ok(ApiResponse::ok(
        "Session is valid",
        SessionInfo {
            user_id: session.user_id,
            session_token: session.session_id.into_inner(),
        },
    ))
}

/// POST /api/v1/auth/logout
///
/// Delete the presented session. Logging out an already-dead session is
/// still a success.
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(session_id): SessionToken,
) -> AppResult<ApiResponse<()>> {
    state.authenticator.invalidate(&session_id).await?;
    tracing::info!("Session invalidated");
    Ok(ApiResponse::empty(StatusCode::OK, "Logged out"))
}
