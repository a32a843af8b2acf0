//! Session extractors.
//!
//! - [`auth::SessionToken`] -- the bearer session id, presented but not yet validated.
//! - [`auth::SessionUser`] -- a validated session and the user it is bound to.

pub mod auth;
