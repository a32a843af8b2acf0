//! Handlers for the `/notes` resource.
//!
//! Each request carries the caller's `userId` (and optionally `sessionId`)
//! next to the bearer token; the gateway checks both agree before touching
//! any note.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use notekeep_core::identity::AssertedIdentity;
use notekeep_core::notes::Note;
use notekeep_core::session::SessionId;
use notekeep_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::SessionToken;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Identity fields every note request asserts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaim {
    pub user_id: DbId,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl From<IdentityClaim> for AssertedIdentity {
    fn from(claim: IdentityClaim) -> Self {
        AssertedIdentity {
            user_id: claim.user_id,
            session_id: claim.session_id.map(SessionId::from),
        }
    }
}

/// Request body for `POST /notes` and `PUT /notes/id/{id}`.
#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    #[serde(flatten)]
    pub identity: IdentityClaim,
    pub data: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/notes
///
/// Subject to the per-user note creation quota.
pub async fn create_note(
    State(state): State<AppState>,
    SessionToken(session_id): SessionToken,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> AppResult<ApiResponse<Note>> {
    let Json(input) = payload?;
    let claim = AssertedIdentity::from(input.identity);

    let note = state
        .gateway
        .create(&session_id, &claim, input.data)
        .await?;
    Ok(ApiResponse::created("Note created successfully", note))
}

/// GET /api/v1/notes?userId=&sessionId=
pub async fn list_notes(
    State(state): State<AppState>,
    SessionToken(session_id): SessionToken,
    query: Result<Query<IdentityClaim>, QueryRejection>,
) -> AppResult<ApiResponse<Vec<Note>>> {
    let Query(identity) = query?;
    let claim = AssertedIdentity::from(identity);

    let notes = state.gateway.list(&session_id, &claim).await?;
    Ok(ApiResponse::ok("User notes retrieved successfully", notes))
}

/// PUT /api/v1/notes/id/{id}
pub async fn update_note(
    State(state): State<AppState>,
    SessionToken(session_id): SessionToken,
    path: Result<Path<DbId>, PathRejection>,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> AppResult<ApiResponse<Note>> {
    let Path(note_id) = path?;
    let Json(input) = payload?;
    let claim = AssertedIdentity::from(input.identity);

    let note = state
        .gateway
        .update(&session_id, &claim, note_id, &input.data)
        .await?;
    Ok(ApiResponse::ok("Note updated successfully", note))
}

/// DELETE /api/v1/notes/id/{id}
///
/// Returns the note as it was before deletion.
pub async fn delete_note(
    State(state): State<AppState>,
    SessionToken(session_id): SessionToken,
    path: Result<Path<DbId>, PathRejection>,
    payload: Result<Json<IdentityClaim>, JsonRejection>,
) -> AppResult<ApiResponse<Note>> {
    let Path(note_id) = path?;
    let Json(identity) = payload?;
    let claim = AssertedIdentity::from(identity);

    let note = state.gateway.delete(&session_id, &claim, note_id).await?;
    Ok(ApiResponse::ok("Note deleted successfully", note))
}
