//! User session model and DTOs.

use notekeep_core::session::SessionRecord;
use notekeep_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `user_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub session_hash: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

/// DTO for inserting a session.
pub struct CreateSession {
    pub session_hash: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl From<UserSession> for SessionRecord {
    fn from(row: UserSession) -> Self {
        SessionRecord {
            user_id: row.user_id,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}
