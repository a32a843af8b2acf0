//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, fallback};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /         -> authenticate (login or implicit registration)
/// GET  /         -> current_session (requires session)
/// POST /logout   -> logout (requires session)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::current_session).post(auth::authenticate))
        .route("/logout", post(auth::logout))
        .method_not_allowed_fallback(fallback::method_not_allowed)
}
