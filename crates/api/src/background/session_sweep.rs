//! Periodic cleanup of expired sessions and stale rate-limit windows.
//!
//! Expired sessions are already rejected on lookup; the sweep only reclaims
//! the storage they occupy.

use std::sync::Arc;
use std::time::Duration;

use notekeep_core::rate_limit::RateLimiter;
use notekeep_core::session::SessionStore;
use tokio_util::sync::CancellationToken;

/// Run one sweep pass. Store failures are logged and otherwise ignored.
pub async fn sweep_once(sessions: &dyn SessionStore, limiter: &RateLimiter) {
    match sessions.purge_expired().await {
        Ok(0) => tracing::debug!("Session sweep: no expired sessions"),
        Ok(purged) => tracing::info!(purged, "Session sweep: purged expired sessions"),
        Err(e) => tracing::error!(error = %e, "Session sweep: purge failed"),
    }

    let dropped = limiter.sweep();
    if dropped > 0 {
        tracing::debug!(dropped, "Session sweep: dropped elapsed rate windows");
    }
}

/// Run the sweep loop every `interval` until `cancel` is triggered.
pub async fn run(
    sessions: Arc<dyn SessionStore>,
    limiter: Arc<RateLimiter>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Session sweep job started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweep job stopping");
                break;
            }
            _ = ticker.tick() => {
                sweep_once(sessions.as_ref(), &limiter).await;
            }
        }
    }
}
