use std::str::FromStr;
use std::time::Duration;

use notekeep_core::authenticator::{AuthConfig, DEFAULT_SESSION_TTL};
use notekeep_core::password::PasswordCost;
use notekeep_core::rate_limit::{RateLimitConfig, DEFAULT_NOTE_LIMIT, DEFAULT_NOTE_WINDOW};

/// Which implementation backs the credential, session and note stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL via `DATABASE_URL`.
    Postgres,
    /// Process-local maps; everything is lost on restart.
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{other}'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Store implementation (default: `postgres`).
    pub backend: StoreBackend,
    /// How often expired sessions and rate windows are swept (default: `300`).
    pub sweep_interval_secs: u64,
    /// Session lifetime and password hashing cost.
    pub auth: AuthConfig,
    /// Note creation quota.
    pub rate_limit: RateLimitConfig,
}

/// Read `key` and parse it, falling back to `default` when unset.
///
/// # Panics
///
/// Panics if the variable is set but does not parse.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} is invalid ('{raw}'): {e}")),
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `3000`                  |
    /// | `CORS_ORIGINS`                | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `STORE_BACKEND`               | `postgres`              |
    /// | `SESSION_TTL_SECS`            | `86400`                 |
    /// | `SESSION_SWEEP_INTERVAL_SECS` | `300`                   |
    /// | `NOTE_RATE_LIMIT`             | `3`                     |
    /// | `NOTE_RATE_WINDOW_SECS`       | `60`                    |
    /// | `ARGON2_MEMORY_KIB`           | `19456`                 |
    /// | `ARGON2_ITERATIONS`           | `2`                     |
    /// | `ARGON2_PARALLELISM`          | `1`                     |
    ///
    /// Misconfiguration panics here, at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);
        let backend: StoreBackend = env_or("STORE_BACKEND", StoreBackend::Postgres);
        let sweep_interval_secs: u64 = env_or("SESSION_SWEEP_INTERVAL_SECS", 300);

        let defaults = PasswordCost::default();
        let password_cost = PasswordCost {
            memory_kib: env_or("ARGON2_MEMORY_KIB", defaults.memory_kib),
            iterations: env_or("ARGON2_ITERATIONS", defaults.iterations),
            parallelism: env_or("ARGON2_PARALLELISM", defaults.parallelism),
        };

        let auth = AuthConfig {
            session_ttl: Duration::from_secs(env_or(
                "SESSION_TTL_SECS",
                DEFAULT_SESSION_TTL.as_secs(),
            )),
            password_cost,
        };

        let rate_limit = RateLimitConfig {
            max_requests: env_or("NOTE_RATE_LIMIT", DEFAULT_NOTE_LIMIT),
            window: Duration::from_secs(env_or(
                "NOTE_RATE_WINDOW_SECS",
                DEFAULT_NOTE_WINDOW.as_secs(),
            )),
        };

        let config = Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            backend,
            sweep_interval_secs,
            auth,
            rate_limit,
        };
        if let Err(e) = config.validate() {
            panic!("Invalid configuration: {e}");
        }
        config
    }

    /// Reject values that parse but cannot work. Every duration and the
    /// note limit must be positive.
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_secs == 0 {
            return Err("REQUEST_TIMEOUT_SECS must be positive".into());
        }
        if self.sweep_interval_secs == 0 {
            return Err("SESSION_SWEEP_INTERVAL_SECS must be positive".into());
        }
        if self.auth.session_ttl.is_zero() {
            return Err("SESSION_TTL_SECS must be positive".into());
        }
        if self.rate_limit.max_requests == 0 {
            return Err("NOTE_RATE_LIMIT must be positive".into());
        }
        if self.rate_limit.window.is_zero() {
            return Err("NOTE_RATE_WINDOW_SECS must be positive".into());
        }
        if let Err(e) = self.auth.password_cost.hasher() {
            return Err(format!(
                "Invalid Argon2 parameters {:?}: {e}",
                self.auth.password_cost
            ));
        }
        Ok(())
    }
}
