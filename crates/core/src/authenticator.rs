//! Session authenticator: login-or-register, session validation and logout.
//!
//! Sessions have a fixed lifetime. Validation never extends a session, so the
//! number of live rows in the session store is bounded by logins per TTL.

use std::sync::Arc;
use std::time::Duration;

use crate::credentials::{CredentialStore, NewUser, User};
use crate::error::{CoreError, StoreError};
use crate::identity::AssertedIdentity;
use crate::password::{hash_password, verify_password, PasswordCost};
use crate::session::{SessionId, SessionRecord, SessionStore};
use crate::types::DbId;

/// Default session lifetime: 24 hours.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Tunables for [`SessionAuthenticator`].
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Fixed lifetime of every issued session.
    pub session_ttl: Duration,
    /// Argon2id cost used when hashing passwords of new users.
    pub password_cost: PasswordCost,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: DEFAULT_SESSION_TTL,
            password_cost: PasswordCost::default(),
        }
    }
}

/// Result of a successful [`SessionAuthenticator::authenticate`] call.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user_id: DbId,
    pub session_id: SessionId,
    /// `true` when the username was unknown and a user was created.
    pub registered: bool,
}

/// Issues, validates and revokes sessions on top of the injected stores.
pub struct SessionAuthenticator {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    config: AuthConfig,
}

impl SessionAuthenticator {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        config: AuthConfig,
    ) -> Self {
        Self {
            credentials,
            sessions,
            config,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.config.session_ttl
    }

    /// The session store this authenticator writes to.
    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Log in, or register when `username` is unknown.
    ///
    /// An unknown username is an implicit registration: the user is created
    /// with `password` and logged in. A known username must present the
    /// matching password. Either way the caller gets a brand-new session;
    /// `previous` (the session the client presented, if any) and every other
    /// session of the user are dropped in the same store operation.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        previous: Option<&SessionId>,
    ) -> Result<AuthOutcome, CoreError> {
        if username.trim().is_empty() {
            return Err(CoreError::Validation("username must not be empty".into()));
        }
        if password.is_empty() {
            return Err(CoreError::Validation("password must not be empty".into()));
        }

        let existing = self
            .credentials
            .find_by_username(username)
            .await
            .map_err(store_failure)?;

        let (user, registered) = match existing {
            Some(user) => {
                self.verify(&user, password).await?;
                (user, false)
            }
            None => self.register(username, password).await?,
        };

        let session_id = SessionId::generate();
        let record = SessionRecord::issue(user.id, self.config.session_ttl);
        self.sessions
            .regenerate(previous, &session_id, &record, self.config.session_ttl)
            .await
            .map_err(store_failure)?;

        tracing::info!(user_id = user.id, registered, "Session issued");

        Ok(AuthOutcome {
            user_id: user.id,
            session_id,
            registered,
        })
    }

    /// Resolve a session id to its user, failing with
    /// [`CoreError::Unauthenticated`] when the session is unknown or expired.
    pub async fn validate(&self, session_id: &SessionId) -> Result<DbId, CoreError> {
        let record = self
            .sessions
            .get(session_id)
            .await
            .map_err(store_failure)?;

        match record {
            Some(record) if !record.is_expired_at(chrono::Utc::now()) => Ok(record.user_id),
            Some(record) => {
                tracing::debug!(user_id = record.user_id, "Rejected expired session");
                Err(CoreError::Unauthenticated)
            }
            None => {
                tracing::debug!("Rejected unknown session");
                Err(CoreError::Unauthenticated)
            }
        }
    }

    /// Delete a session. Deleting an absent session succeeds.
    pub async fn invalidate(&self, session_id: &SessionId) -> Result<(), CoreError> {
        self.sessions
            .delete(session_id)
            .await
            .map_err(store_failure)
    }

    /// Validate the presented session and check the request's identity claim
    /// against it. Returns the authoritative user id.
    ///
    /// Any disagreement is reported as [`CoreError::Unauthenticated`], the
    /// same error as a missing session.
    pub async fn authorize(
        &self,
        session_id: &SessionId,
        claim: &AssertedIdentity,
    ) -> Result<DbId, CoreError> {
        let user_id = self.validate(session_id).await?;
        claim.verify(session_id, user_id)?;
        Ok(user_id)
    }

    async fn register(&self, username: &str, password: &str) -> Result<(User, bool), CoreError> {
        let password_hash = {
            let password = password.to_string();
            let cost = self.config.password_cost;
            tokio::task::spawn_blocking(move || hash_password(&password, &cost))
                .await
                .map_err(|e| CoreError::Internal(format!("Password hashing task failed: {e}")))?
                .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")))?
        };

        let input = NewUser {
            username: username.to_string(),
            password_hash,
        };
        match self.credentials.save(input).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "User registered");
                Ok((user, true))
            }
            // Lost a race against a concurrent first login with the same
            // username: the winner's password decides.
            Err(StoreError::Conflict(_)) => {
                let user = self
                    .credentials
                    .find_by_username(username)
                    .await
                    .map_err(store_failure)?
                    .ok_or_else(|| {
                        CoreError::Internal(format!(
                            "User '{username}' conflicted on insert but cannot be found"
                        ))
                    })?;
                self.verify(&user, password).await?;
                Ok((user, false))
            }
            Err(e) => Err(store_failure(e)),
        }
    }

    async fn verify(&self, user: &User, password: &str) -> Result<(), CoreError> {
        let matches = {
            let password = password.to_string();
            let hash = user.password_hash.clone();
            tokio::task::spawn_blocking(move || verify_password(&password, &hash))
                .await
                .map_err(|e| CoreError::Internal(format!("Password verification task failed: {e}")))?
                .map_err(|e| CoreError::Internal(format!("Password verification error: {e}")))?
        };

        if matches {
            Ok(())
        } else {
            tracing::warn!(user_id = user.id, "Login rejected: wrong password");
            Err(CoreError::InvalidCredentials)
        }
    }
}

/// Log a collaborator failure and surface it as `StoreUnavailable`.
fn store_failure(err: StoreError) -> CoreError {
    tracing::error!(error = %err, "Store call failed");
    err.into()
}
