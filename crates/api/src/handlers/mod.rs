pub mod auth;
pub mod fallback;
pub mod notes;
