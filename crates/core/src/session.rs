//! Session identifiers, session records and the session store contract.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::error::StoreError;
use crate::types::{DbId, Timestamp};

/// Length of a generated session id (alphanumeric characters, ~285 bits).
pub const SESSION_ID_LENGTH: usize = 48;

/// Opaque, unguessable session identifier handed to the client.
///
/// `Debug` output is redacted so ids never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random session id.
    pub fn generate() -> Self {
        let id: String = rand::rng()
            .sample_iter(&rand::distr::Alphanumeric)
            .take(SESSION_ID_LENGTH)
            .map(char::from)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(<redacted>)")
    }
}

/// Server-side state bound to a session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl SessionRecord {
    /// Build a record for `user_id` starting now and living for `ttl`.
    pub fn issue(user_id: DbId, ttl: Duration) -> Self {
        let created_at = chrono::Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC);
        Self {
            user_id,
            created_at,
            expires_at,
        }
    }

    /// Whether the session is past its fixed expiry at `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// Key/value store for sessions with per-key expiry.
///
/// Implementations must never return a record whose TTL has elapsed, even if
/// it has not been physically removed yet.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError>;

    /// Store `record` under `id`, expiring after `ttl`.
    async fn put(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Remove a session. Removing an absent id is not an error.
    async fn delete(&self, id: &SessionId) -> Result<(), StoreError>;

    /// Atomically drop `previous` (if any) and every session bound to
    /// `record.user_id`, then install `record` under `id`.
    ///
    /// Once this returns `Ok`, no dropped id may validate again.
    async fn regenerate(
        &self,
        previous: Option<&SessionId>,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Physically remove expired sessions. Returns how many were removed.
    async fn purge_expired(&self) -> Result<u64, StoreError>;
}
