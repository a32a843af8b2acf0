//! Route definitions for the `/notes` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{fallback, notes};
use crate::state::AppState;

/// Routes mounted at `/notes`. All require a session.
///
/// ```text
/// GET    /          -> list_notes
/// POST   /          -> create_note (rate limited)
/// PUT    /id/{id}   -> update_note
/// DELETE /id/{id}   -> delete_note
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notes::list_notes).post(notes::create_note))
        .route(
            "/id/{id}",
            put(notes::update_note).delete(notes::delete_note),
        )
        .method_not_allowed_fallback(fallback::method_not_allowed)
}
