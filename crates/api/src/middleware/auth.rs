//! Session-token authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use notekeep_core::error::CoreError;
use notekeep_core::session::SessionId;
use notekeep_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Read the session id from `Authorization: Bearer <session id>`.
///
/// Returns `None` when the header is missing, malformed or empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(SessionId::from)
}

/// The session id presented by the client, not yet checked against the
/// session store.
///
/// Note handlers take this and let the gateway validate it together with the
/// identity claim from the body.
#[derive(Debug, Clone)]
pub struct SessionToken(pub SessionId);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers)
            .map(SessionToken)
            .ok_or(AppError::Core(CoreError::Unauthenticated))
    }
}

/// Authenticated session extracted from the bearer token:
///
/// ```ignore
/// async fn my_handler(session: SessionUser) -> AppResult<ApiResponse<()>> {
///     tracing::info!(user_id = session.user_id, "handling request");
///     Ok(ApiResponse::empty(StatusCode::OK, "done"))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: DbId,
    pub session_id: SessionId,
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SessionToken(session_id) = SessionToken::from_request_parts(parts, state).await?;
        let user_id = state.authenticator.validate(&session_id).await?;
        Ok(SessionUser {
            user_id,
            session_id,
        })
    }
}
