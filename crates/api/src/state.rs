use std::sync::Arc;

use notekeep_core::authenticator::SessionAuthenticator;
use notekeep_core::credentials::CredentialStore;
use notekeep_core::gateway::NoteGateway;
use notekeep_core::memory::{InMemoryCredentialStore, InMemoryNoteStore, InMemorySessionStore};
use notekeep_core::notes::NoteStore;
use notekeep_core::rate_limit::RateLimiter;
use notekeep_core::session::SessionStore;
use notekeep_db::stores::{PgCredentialStore, PgNoteStore, PgSessionStore};
use notekeep_db::DbPool;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Login, session validation and identity checks.
    pub authenticator: Arc<SessionAuthenticator>,
    /// Guarded, rate-limited note operations.
    pub gateway: Arc<NoteGateway>,
    /// Database pool when running on the Postgres backend.
    pub pool: Option<DbPool>,
}

impl AppState {
    /// Wire the core against Postgres-backed stores.
    pub fn postgres(config: ServerConfig, pool: DbPool) -> Self {
        Self::assemble(
            config,
            Arc::new(PgCredentialStore::new(pool.clone())),
            Arc::new(PgSessionStore::new(pool.clone())),
            Arc::new(PgNoteStore::new(pool.clone())),
            Some(pool),
        )
    }

    /// Wire the core against process-local stores.
    pub fn in_memory(config: ServerConfig) -> Self {
        Self::assemble(
            config,
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryNoteStore::new()),
            None,
        )
    }

    /// Wire the core against arbitrary store implementations.
    pub fn assemble(
        config: ServerConfig,
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        notes: Arc<dyn NoteStore>,
        pool: Option<DbPool>,
    ) -> Self {
        let authenticator = Arc::new(SessionAuthenticator::new(
            credentials,
            sessions,
            config.auth.clone(),
        ));
        let limiter = Arc::new(RateLimiter::new(config.rate_limit));
        let gateway = Arc::new(NoteGateway::new(
            Arc::clone(&authenticator),
            limiter,
            notes,
        ));

        Self {
            config: Arc::new(config),
            authenticator,
            gateway,
            pool,
        }
    }
}
