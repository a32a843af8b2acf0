//! Identity consistency guard.
//!
//! Note requests carry the caller's user id (and, from older clients, the
//! session id) in the request itself, next to the session token that actually
//! authenticates them. Those body-level assertions are gathered into one
//! [`AssertedIdentity`] and checked in one place.

use crate::error::CoreError;
use crate::session::SessionId;
use crate::types::DbId;

/// Identity claimed by a request, independent of the session it presents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertedIdentity {
    pub user_id: DbId,
    /// Only sent by legacy clients.
    pub session_id: Option<SessionId>,
}

impl AssertedIdentity {
    pub fn new(user_id: DbId) -> Self {
        Self {
            user_id,
            session_id: None,
        }
    }

    pub fn with_session(user_id: DbId, session_id: SessionId) -> Self {
        Self {
            user_id,
            session_id: Some(session_id),
        }
    }

    /// Check the claim against the authoritative session.
    ///
    /// `presented` is the session the request authenticated with and
    /// `authoritative_user` the user it is bound to. Every kind of mismatch
    /// yields the same [`CoreError::Unauthenticated`].
    pub fn verify(&self, presented: &SessionId, authoritative_user: DbId) -> Result<(), CoreError> {
        if self.user_id != authoritative_user {
            tracing::warn!(
                asserted_user_id = self.user_id,
                session_user_id = authoritative_user,
                "Identity claim does not match session"
            );
            return Err(CoreError::Unauthenticated);
        }
        if let Some(asserted) = &self.session_id {
            if asserted != presented {
                tracing::warn!(
                    session_user_id = authoritative_user,
                    "Asserted session id does not match presented session"
                );
                return Err(CoreError::Unauthenticated);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn matching_user_passes() {
        let session = SessionId::generate();
        assert!(AssertedIdentity::new(5).verify(&session, 5).is_ok());
    }

    #[test]
    fn other_user_is_unauthenticated() {
        let session = SessionId::generate();
        assert_matches!(
            AssertedIdentity::new(6).verify(&session, 5),
            Err(CoreError::Unauthenticated)
        );
    }

    #[test]
    fn asserted_session_must_be_the_presented_one() {
        let presented = SessionId::generate();
        let claim = AssertedIdentity::with_session(5, presented.clone());
        assert!(claim.verify(&presented, 5).is_ok());

        let claim = AssertedIdentity::with_session(5, SessionId::generate());
        assert_matches!(
            claim.verify(&presented, 5),
            Err(CoreError::Unauthenticated)
        );
    }
}
