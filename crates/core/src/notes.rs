//! Note store contract.
//!
//! Every lookup that targets a single note is keyed by both the note id and
//! the owning user, so a store can never hand one user's note to another.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::StoreError;
use crate::types::{DbId, Timestamp};

/// A stored note.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: DbId,
    pub user_id: DbId,
    pub data: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub user_id: DbId,
    pub data: String,
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert a note, returning it with its assigned id.
    async fn insert(&self, note: NewNote) -> Result<Note, StoreError>;

    /// All notes owned by `user_id`, in store-native order.
    async fn find_by_owner(&self, user_id: DbId) -> Result<Vec<Note>, StoreError>;

    async fn find_one_by_id_and_owner(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Note>, StoreError>;

    /// Replace the note's data. Returns the updated note, or `None` when no
    /// note with `id` is owned by `user_id`.
    async fn update_one_by_id_and_owner(
        &self,
        id: DbId,
        user_id: DbId,
        data: &str,
    ) -> Result<Option<Note>, StoreError>;

    /// Delete the note, returning its prior contents, or `None` when no note
    /// with `id` is owned by `user_id`.
    async fn delete_one_by_id_and_owner(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Note>, StoreError>;
}
