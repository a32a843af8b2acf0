//! Note entity model.

use notekeep_core::notes::Note;
use notekeep_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `notes` table.
#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    pub id: DbId,
    pub user_id: DbId,
    pub data: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: row.id,
            user_id: row.user_id,
            data: row.data,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
