//! Row types mapped with `sqlx::FromRow`.

pub mod note;
pub mod session;
pub mod user;
