//! Per-user fixed-window limiter for note creation.
//!
//! Each user gets one `RateWindow`. The map itself sits behind a read-mostly
//! lock that is only taken for writing when a user is seen for the first time
//! or during a sweep; the counter of each user has its own mutex, so checks
//! for different users never wait on each other and concurrent checks for the
//! same user are serialized.
//!
//! State is process-local and is lost on restart.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};

use crate::error::CoreError;
use crate::types::DbId;

/// Default number of notes a user may create per window.
pub const DEFAULT_NOTE_LIMIT: u32 = 3;

/// Default window length.
pub const DEFAULT_NOTE_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Admissions allowed per window.
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_NOTE_LIMIT,
            window: DEFAULT_NOTE_WINDOW,
        }
    }
}

#[derive(Debug)]
struct RateWindow {
    started_at: Instant,
    count: u32,
}

impl RateWindow {
    fn is_elapsed_at(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.started_at) >= window
    }
}

pub struct RateLimiter {
    config: RateLimitConfig,
    windows: RwLock<HashMap<DbId, Mutex<RateWindow>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Count one attempt for `user_id` now.
    pub fn check(&self, user_id: DbId) -> Result<(), CoreError> {
        self.check_at(user_id, Instant::now())
    }

    /// Count one attempt for `user_id` at `now`.
    ///
    /// A rejected attempt leaves the window untouched.
    pub fn check_at(&self, user_id: DbId, now: Instant) -> Result<(), CoreError> {
        {
            let windows = self.windows.read();
            if let Some(slot) = windows.get(&user_id) {
                return self.admit(&mut slot.lock(), user_id, now);
            }
        }

        let mut windows = self.windows.write();
        let slot = windows.entry(user_id).or_insert_with(|| {
            Mutex::new(RateWindow {
                started_at: now,
                count: 0,
            })
        });
        self.admit(slot.get_mut(), user_id, now)
    }

    fn admit(&self, window: &mut RateWindow, user_id: DbId, now: Instant) -> Result<(), CoreError> {
        if window.is_elapsed_at(now, self.config.window) {
            window.started_at = now;
            window.count = 1;
            return Ok(());
        }
        if window.count < self.config.max_requests {
            window.count += 1;
            return Ok(());
        }

        let remaining = self
            .config
            .window
            .saturating_sub(now.saturating_duration_since(window.started_at));
        let retry_after_secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        tracing::warn!(
            user_id,
            limit = self.config.max_requests,
            retry_after_secs,
            "Note creation rate limit exceeded"
        );
        Err(CoreError::RateLimitExceeded {
            retry_after_secs: retry_after_secs.max(1),
        })
    }

    /// Drop windows that have fully elapsed at `now`. Returns how many were
    /// removed.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let window = self.config.window;
        let mut windows = self.windows.write();
        let before = windows.len();
        windows.retain(|_, slot| !slot.get_mut().is_elapsed_at(now, window));
        before - windows.len()
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Number of users currently tracked.
    pub fn tracked_users(&self) -> usize {
        self.windows.read().len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn fourth_attempt_in_window_is_rejected() {
        let limiter = RateLimiter::default();
        let start = Instant::now();

        for i in 0..3 {
            assert!(limiter.check_at(1, start + Duration::from_secs(i)).is_ok());
        }
        assert_matches!(
            limiter.check_at(1, start + Duration::from_secs(10)),
            Err(CoreError::RateLimitExceeded { retry_after_secs: 50 })
        );
    }

    #[test]
    fn window_resets_after_it_elapses() {
        let limiter = RateLimiter::default();
        let start = Instant::now();

        for _ in 0..3 {
            limiter.check_at(1, start).unwrap();
        }
        assert!(limiter.check_at(1, start + Duration::from_secs(59)).is_err());
        assert!(limiter.check_at(1, start + Duration::from_secs(60)).is_ok());

        // The reset opened a fresh window with one admission in it.
        let later = start + Duration::from_secs(60);
        limiter.check_at(1, later).unwrap();
        limiter.check_at(1, later).unwrap();
        assert!(limiter.check_at(1, later).is_err());
    }

    #[test]
    fn users_are_limited_independently() {
        let limiter = RateLimiter::default();
        let now = Instant::now();
        for _ in 0..3 {
            limiter.check_at(1, now).unwrap();
        }
        assert!(limiter.check_at(1, now).is_err());
        assert!(limiter.check_at(2, now).is_ok());
    }

    #[test]
    fn sweep_drops_only_elapsed_windows() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        limiter.check_at(1, start).unwrap();
        limiter.check_at(2, start + Duration::from_secs(30)).unwrap();

        assert_eq!(limiter.sweep_at(start + Duration::from_secs(61)), 1);
        assert_eq!(limiter.tracked_users(), 1);
    }

    #[test]
    fn concurrent_attempts_for_one_user_never_overshoot() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 5,
            window: Duration::from_secs(60),
        });
        let admitted = AtomicU32::new(0);
        let now = Instant::now();

        std::thread::scope(|scope| {
            for _ in 0..32 {
                scope.spawn(|| {
                    if limiter.check_at(9, now).is_ok() {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(admitted.load(Ordering::SeqCst), 5);
    }
}
