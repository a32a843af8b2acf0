//! Postgres implementations of the core store traits.
//!
//! Sessions are looked up by the SHA-256 digest of the session id, so the
//! plaintext id only ever exists on the client and in request memory.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use notekeep_core::credentials::{CredentialStore, NewUser, User};
use notekeep_core::error::StoreError;
use notekeep_core::hashing::sha256_hex;
use notekeep_core::notes::{NewNote, Note, NoteStore};
use notekeep_core::session::{SessionId, SessionRecord, SessionStore};
use notekeep_core::types::{DbId, Timestamp};

use crate::models::session::CreateSession;
use crate::repositories::{NoteRepo, SessionRepo, UserRepo};
use crate::DbPool;

/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Classify a sqlx error for the core: unique violations are conflicts,
/// everything else means the store is unavailable.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return StoreError::Conflict(format!("unique constraint {constraint} violated"));
        }
    }
    StoreError::Unavailable(err.to_string())
}

fn session_hash(id: &SessionId) -> String {
    sha256_hex(id.as_str().as_bytes())
}

fn expiry_after(ttl: Duration) -> Timestamp {
    let now = Utc::now();
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC)
}

fn create_session(id: &SessionId, record: &SessionRecord, ttl: Duration) -> CreateSession {
    CreateSession {
        session_hash: session_hash(id),
        user_id: record.user_id,
        created_at: record.created_at,
        // The row expires on the store TTL; the record's own expiry is never
        // later than that for sessions issued by the authenticator.
        expires_at: record.expires_at.min(expiry_after(ttl)),
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = UserRepo::find_by_username(&self.pool, username)
            .await
            .map_err(classify)?;
        Ok(row.map(User::from))
    }

    async fn save(&self, user: NewUser) -> Result<User, StoreError> {
        let row = UserRepo::create(&self.pool, &user.username, &user.password_hash)
            .await
            .map_err(classify)?;
        Ok(row.into())
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let row = SessionRepo::find_active(&self.pool, &session_hash(id))
            .await
            .map_err(classify)?;
        Ok(row.map(SessionRecord::from))
    }

    async fn put(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        SessionRepo::upsert(&self.pool, &create_session(id, record, ttl))
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        SessionRepo::delete(&self.pool, &session_hash(id))
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn regenerate(
        &self,
        previous: Option<&SessionId>,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let previous_hash = previous.map(session_hash);
        SessionRepo::replace_for_user(
            &self.pool,
            previous_hash.as_deref(),
            &create_session(id, record, ttl),
        )
        .await
        .map_err(classify)?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        SessionRepo::cleanup_expired(&self.pool)
            .await
            .map_err(classify)
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgNoteStore {
    pool: DbPool,
}

impl PgNoteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn insert(&self, note: NewNote) -> Result<Note, StoreError> {
        let row = NoteRepo::create(&self.pool, note.user_id, &note.data)
            .await
            .map_err(classify)?;
        Ok(row.into())
    }

    async fn find_by_owner(&self, user_id: DbId) -> Result<Vec<Note>, StoreError> {
        let rows = NoteRepo::list_by_owner(&self.pool, user_id)
            .await
            .map_err(classify)?;
        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn find_one_by_id_and_owner(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Note>, StoreError> {
        let row = NoteRepo::find_by_id_and_owner(&self.pool, id, user_id)
            .await
            .map_err(classify)?;
        Ok(row.map(Note::from))
    }

    async fn update_one_by_id_and_owner(
        &self,
        id: DbId,
        user_id: DbId,
        data: &str,
    ) -> Result<Option<Note>, StoreError> {
        let row = NoteRepo::update_by_id_and_owner(&self.pool, id, user_id, data)
            .await
            .map_err(classify)?;
        Ok(row.map(Note::from))
    }

    async fn delete_one_by_id_and_owner(
        &self,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Note>, StoreError> {
        let row = NoteRepo::delete_by_id_and_owner(&self.pool, id, user_id)
            .await
            .map_err(classify)?;
        Ok(row.map(Note::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_rows_are_keyed_by_digest() {
        let id = SessionId::from("plaintext-session");
        let hash = session_hash(&id);
        assert_eq!(hash.len(), 64);
        assert!(!hash.contains("plaintext"));
    }

    #[test]
    fn row_expiry_never_exceeds_store_ttl() {
        let id = SessionId::generate();
        let record = SessionRecord::issue(1, Duration::from_secs(3600));
        let row = create_session(&id, &record, Duration::from_secs(60));
        assert!(row.expires_at <= Utc::now() + chrono::Duration::seconds(61));
    }

    #[test]
    fn non_database_errors_are_unavailable() {
        assert!(matches!(
            classify(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
    }
}
