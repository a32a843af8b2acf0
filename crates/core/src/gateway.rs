//! Note gateway: the only entry point to note operations.
//!
//! Every operation first passes the identity consistency guard; creation is
//! additionally gated by the per-user rate limiter. The guard runs before the
//! limiter so that rejected identities never consume anyone's quota.

use std::sync::Arc;

use crate::authenticator::SessionAuthenticator;
use crate::error::{CoreError, StoreError};
use crate::identity::AssertedIdentity;
use crate::notes::{NewNote, Note, NoteStore};
use crate::rate_limit::RateLimiter;
use crate::session::SessionId;
use crate::types::DbId;

pub struct NoteGateway {
    authenticator: Arc<SessionAuthenticator>,
    limiter: Arc<RateLimiter>,
    notes: Arc<dyn NoteStore>,
}

impl NoteGateway {
    pub fn new(
        authenticator: Arc<SessionAuthenticator>,
        limiter: Arc<RateLimiter>,
        notes: Arc<dyn NoteStore>,
    ) -> Self {
        Self {
            authenticator,
            limiter,
            notes,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub async fn create(
        &self,
        session: &SessionId,
        claim: &AssertedIdentity,
        data: String,
    ) -> Result<Note, CoreError> {
        let user_id = self.authenticator.authorize(session, claim).await?;
        self.limiter.check(user_id)?;

        let note = self
            .notes
            .insert(NewNote { user_id, data })
            .await
            .map_err(store_failure)?;
        tracing::info!(user_id, note_id = note.id, "Note created");
        Ok(note)
    }

    pub async fn list(
        &self,
        session: &SessionId,
        claim: &AssertedIdentity,
    ) -> Result<Vec<Note>, CoreError> {
        let user_id = self.authenticator.authorize(session, claim).await?;
        self.notes
            .find_by_owner(user_id)
            .await
            .map_err(store_failure)
    }

    /// Replace the data of a note owned by the caller.
    ///
    /// A note owned by someone else is reported exactly like a missing one.
    pub async fn update(
        &self,
        session: &SessionId,
        claim: &AssertedIdentity,
        note_id: DbId,
        data: &str,
    ) -> Result<Note, CoreError> {
        let user_id = self.authenticator.authorize(session, claim).await?;
        let note = self
            .notes
            .update_one_by_id_and_owner(note_id, user_id, data)
            .await
            .map_err(store_failure)?
            .ok_or(CoreError::NotFound)?;
        tracing::info!(user_id, note_id, "Note updated");
        Ok(note)
    }

    /// Delete a note owned by the caller, returning its prior contents.
    pub async fn delete(
        &self,
        session: &SessionId,
        claim: &AssertedIdentity,
        note_id: DbId,
    ) -> Result<Note, CoreError> {
        let user_id = self.authenticator.authorize(session, claim).await?;
        let note = self
            .notes
            .delete_one_by_id_and_owner(note_id, user_id)
            .await
            .map_err(store_failure)?
            .ok_or(CoreError::NotFound)?;
        tracing::info!(user_id, note_id, "Note deleted");
        Ok(note)
    }
}

fn store_failure(err: StoreError) -> CoreError {
    tracing::error!(error = %err, "Note store call failed");
    err.into()
}
