//! Domain core for the notekeep service.
//!
//! Holds the session authenticator, the identity consistency guard, the
//! per-user note rate limiter and the note gateway, together with the
//! collaborator traits (credential, session and note stores) they are
//! written against. Nothing in here knows about HTTP or Postgres.

pub mod authenticator;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod hashing;
pub mod identity;
pub mod memory;
pub mod notes;
pub mod password;
pub mod rate_limit;
pub mod session;
pub mod types;
