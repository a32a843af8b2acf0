//! Repository for the `notes` table.
//!
//! Single-note queries always filter on both `id` and `user_id`.

use sqlx::PgPool;
use notekeep_core::types::DbId;

use crate::models::note::NoteRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, data, created_at, updated_at";

/// Provides CRUD operations for notes.
pub struct NoteRepo;

impl NoteRepo {
    /// Insert a new note, returning the created row.
    pub async fn create(pool: &PgPool, user_id: DbId, data: &str) -> Result<NoteRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO notes (user_id, data)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NoteRow>(&query)
            .bind(user_id)
            .bind(data)
            .fetch_one(pool)
            .await
    }

    /// List all notes owned by a user, oldest first.
    pub async fn list_by_owner(pool: &PgPool, user_id: DbId) -> Result<Vec<NoteRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notes WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, NoteRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<NoteRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notes WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, NoteRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a note's data. Returns `None` if no note `id` is owned by `user_id`.
    pub async fn update_by_id_and_owner(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        data: &str,
    ) -> Result<Option<NoteRow>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET data = $3, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NoteRow>(&query)
            .bind(id)
            .bind(user_id)
            .bind(data)
            .fetch_optional(pool)
            .await
    }

    /// Delete a note, returning the removed row.
    pub async fn delete_by_id_and_owner(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<NoteRow>, sqlx::Error> {
        let query = format!(
            "DELETE FROM notes WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NoteRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
