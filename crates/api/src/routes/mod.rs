pub mod auth;
pub mod health;
pub mod notes;

use axum::Router;

use crate::handlers::fallback;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth                      login or register (POST), current session (GET)
/// /auth/logout               logout (POST, requires session)
///
/// /notes                     list (GET ?userId=&sessionId=), create (POST)
/// /notes/id/{id}             update (PUT), delete (DELETE)
/// ```
///
/// Unknown paths and unsupported methods answer 404/405 in the envelope.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Session login/registration and logout.
        .nest("/auth", auth::router())
        // Guarded note CRUD.
        .nest("/notes", notes::router())
        .fallback(fallback::not_found)
}
