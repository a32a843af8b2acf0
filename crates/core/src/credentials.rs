//! Credential store contract: user identities and their password hashes.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{DbId, Timestamp};

/// A registered user.
///
/// Contains the password hash -- never serialize this to API responses.
#[derive(Debug, Clone)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub password_hash: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

/// Lookup and persistence of user credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user by username (case-sensitive).
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Persist a new user, returning the stored row with its assigned id.
    ///
    /// Fails with [`StoreError::Conflict`] when the username is already taken.
    async fn save(&self, user: NewUser) -> Result<User, StoreError>;
}
