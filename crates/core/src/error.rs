/// Domain errors surfaced by the authenticator, the guard, the rate limiter
/// and the note gateway.
///
/// `Unauthenticated` deliberately covers both a missing/expired session and
/// an identity claim that disagrees with the session, and `NotFound` covers
/// both a missing note and a note owned by somebody else. Callers must not
/// be able to tell those cases apart.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Note creation limit exceeded, retry in {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("Note not found")]
    NotFound,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure reported by a collaborator store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (e.g. a username that was
    /// registered concurrently).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backing service could not be reached or failed the request.
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) | StoreError::Unavailable(msg) => {
                CoreError::StoreUnavailable(msg)
            }
        }
    }
}
