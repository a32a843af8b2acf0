//! In-process implementations of the store contracts.
//!
//! Used by the `memory` backend and throughout the test suites. State lives
//! behind a `tokio::sync::RwLock` and is lost when the process exits.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::credentials::{CredentialStore, NewUser, User};
use crate::error::StoreError;
use crate::notes::{NewNote, Note, NoteStore};
use crate::session::{SessionId, SessionRecord, SessionStore};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[derive(Default)]
struct UserTable {
    by_username: HashMap<String, User>,
    last_id: DbId,
}

/// Credential store backed by a process-local map.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<UserTable>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.by_username.get(username).cloned())
    }

    async fn save(&self, user: NewUser) -> Result<User, StoreError> {
        let mut table = self.users.write().await;
        if table.by_username.contains_key(&user.username) {
            return Err(StoreError::Conflict(format!(
                "username '{}' is already registered",
                user.username
            )));
        }
        table.last_id += 1;
        let stored = User {
            id: table.last_id,
            username: user.username,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        table
            .by_username
            .insert(stored.username.clone(), stored.clone());
        Ok(stored)
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

struct SessionEntry {
    record: SessionRecord,
    evict_at: Timestamp,
}

impl SessionEntry {
    fn is_live_at(&self, now: Timestamp) -> bool {
        now < self.evict_at && !self.record.is_expired_at(now)
    }
}

/// Session store backed by a process-local map with lazy TTL eviction.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn evict_at(ttl: Duration) -> Timestamp {
    let now = Utc::now();
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC)
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let now = Utc::now();
        Ok(self
            .sessions
            .read()
            .await
            .get(id)
            .filter(|entry| entry.is_live_at(now))
            .map(|entry| entry.record.clone()))
    }

    async fn put(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let entry = SessionEntry {
            record: record.clone(),
            evict_at: evict_at(ttl),
        };
        self.sessions.write().await.insert(id.clone(), entry);
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn regenerate(
        &self,
        previous: Option<&SessionId>,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let entry = SessionEntry {
            record: record.clone(),
            evict_at: evict_at(ttl),
        };
        // One write guard covers the removal and the insert.
        let mut sessions = self.sessions.write().await;
        if let Some(previous) = previous {
            sessions.remove(previous);
        }
        sessions.retain(|_, existing| existing.record.user_id != record.user_id);
        sessions.insert(id.clone(), entry);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.is_live_at(now));
        Ok((before - sessions.len()) as u64)
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct NoteTable {
    rows: BTreeMap<DbId, Note>,
    last_id: DbId,
}

/// Note store backed by a process-local ordered map (id order).
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<NoteTable>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn insert(&self, note: NewNote) -> Result<Note, StoreError> {
        let mut table = self.notes.write().await;
        table.last_id += 1;
        let now = Utc::now();
        let stored = Note {
            id: table.last_id,
            user_id: note.user_id,
            data: note.data,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_owner(&self, user_id: DbId) -> Result<Vec<Note>, StoreError> {
        Ok(self
            .notes
            .read()
            .await
            .rows
            .values()
            .filter(|note| note.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_one_by_id_and_owner(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Note>, StoreError> {
        Ok(self
            .notes
            .read()
            .await
            .rows
            .get(&id)
            .filter(|note| note.user_id == user_id)
            .cloned())
    }

    async fn update_one_by_id_and_owner(
        &self,
        id: DbId,
        user_id: DbId,
        data: &str,
    ) -> Result<Option<Note>, StoreError> {
        let mut table = self.notes.write().await;
        Ok(table
            .rows
            .get_mut(&id)
            .filter(|note| note.user_id == user_id)
            .map(|note| {
                note.data = data.to_string();
                note.updated_at = Utc::now();
                note.clone()
            }))
    }

    async fn delete_one_by_id_and_owner(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Note>, StoreError> {
        let mut table = self.notes.write().await;
        let owned = table
            .rows
            .get(&id)
            .is_some_and(|note| note.user_id == user_id);
        if !owned {
            return Ok(None);
        }
        Ok(table.rows.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn saving_a_taken_username_conflicts() {
        let store = InMemoryCredentialStore::new();
        let first = NewUser {
            username: "alice".into(),
            password_hash: "h1".into(),
        };
        let user = store.save(first.clone()).await.unwrap();
        assert_eq!(user.id, 1);

        let result = store.save(first).await;
        assert_matches!(result, Err(StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn expired_sessions_are_hidden_and_purged() {
        let store = InMemorySessionStore::new();
        let live = SessionId::generate();
        let dead = SessionId::generate();
        let ttl = Duration::from_secs(60);

        store
            .put(&live, &SessionRecord::issue(1, ttl), ttl)
            .await
            .unwrap();
        store
            .put(&dead, &SessionRecord::issue(2, Duration::ZERO), Duration::ZERO)
            .await
            .unwrap();

        assert!(store.get(&live).await.unwrap().is_some());
        assert!(store.get(&dead).await.unwrap().is_none());
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn regenerate_drops_every_session_of_the_user() {
        let store = InMemorySessionStore::new();
        let ttl = Duration::from_secs(60);
        let old_a = SessionId::generate();
        let old_b = SessionId::generate();
        let other_user = SessionId::generate();
        store.put(&old_a, &SessionRecord::issue(1, ttl), ttl).await.unwrap();
        store.put(&old_b, &SessionRecord::issue(1, ttl), ttl).await.unwrap();
        store
            .put(&other_user, &SessionRecord::issue(2, ttl), ttl)
            .await
            .unwrap();

        let fresh = SessionId::generate();
        store
            .regenerate(Some(&old_a), &fresh, &SessionRecord::issue(1, ttl), ttl)
            .await
            .unwrap();

        assert!(store.get(&old_a).await.unwrap().is_none());
        assert!(store.get(&old_b).await.unwrap().is_none());
        assert_eq!(store.get(&fresh).await.unwrap().map(|r| r.user_id), Some(1));
        assert!(store.get(&other_user).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn note_lookups_require_matching_owner() {
        let store = InMemoryNoteStore::new();
        let note = store
            .insert(NewNote {
                user_id: 1,
                data: "mine".into(),
            })
            .await
            .unwrap();

        assert!(store.find_one_by_id_and_owner(note.id, 2).await.unwrap().is_none());
        assert!(store
            .update_one_by_id_and_owner(note.id, 2, "stolen")
            .await
            .unwrap()
            .is_none());
        assert!(store.delete_one_by_id_and_owner(note.id, 2).await.unwrap().is_none());

        let kept = store.find_one_by_id_and_owner(note.id, 1).await.unwrap();
        assert_eq!(kept.map(|n| n.data), Some("mine".to_string()));
    }

    #[tokio::test]
    async fn delete_returns_prior_contents() {
        let store = InMemoryNoteStore::new();
        let note = store
            .insert(NewNote {
                user_id: 3,
                data: "bye".into(),
            })
            .await
            .unwrap();

        let deleted = store.delete_one_by_id_and_owner(note.id, 3).await.unwrap();
        assert_eq!(deleted, Some(note));
        assert!(store.find_by_owner(3).await.unwrap().is_empty());
    }
}
