//! Connection health state machine.
//!
//! # States
//! - Healthy: calls go straight through
//! - Unhealthy: consecutive failures reached the threshold
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: consecutive failures >= unhealthy_threshold
//! Unhealthy → Healthy: any single success
//! ```
//!
//! Throttling needs both an unhealthy flag and a stale last success, so a
//! connection that just failed a few times but succeeded recently is left
//! alone. Platforms without health monitoring never throttle.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

use crate::config::HealthConfig;
use crate::observability::metrics;

/// Point-in-time view of the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionHealthState {
    pub is_healthy: bool,
    pub last_success_at: Instant,
    pub consecutive_failures: u32,
}

/// Tracks consecutive outcomes of store calls for one running instance.
#[derive(Debug)]
pub struct ConnectionHealth {
    enabled: bool,
    unhealthy_threshold: u32,
    stale_after: Duration,

    /// Reference point for `last_success_ms`.
    epoch: Instant,
    healthy: AtomicBool,
    consecutive_failures: AtomicU32,
    /// Milliseconds from `epoch` to the last success (or reset).
    last_success_ms: AtomicU64,
}

impl ConnectionHealth {
    pub fn new(config: &HealthConfig, enabled: bool) -> Self {
        Self {
            enabled,
            unhealthy_threshold: config.unhealthy_threshold.max(1),
            stale_after: config.stale_after(),
            epoch: Instant::now(),
            healthy: AtomicBool::new(true),
            consecutive_failures: AtomicU32::new(0),
            last_success_ms: AtomicU64::new(0),
        }
    }

    /// Whether this monitor may throttle at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ConnectionHealthState {
        ConnectionHealthState {
            is_healthy: self.is_healthy(),
            last_success_at: self.last_success_at(),
            consecutive_failures: self.consecutive_failures(),
        }
    }

    /// Report a successful store call.
    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.last_success_ms.store(self.now_ms(), Ordering::Relaxed);

        if !self.healthy.swap(true, Ordering::Relaxed) {
            tracing::info!("Store connection recovered");
        }
        metrics::record_connection_health(true);
    }

    /// Report a failed store call.
    pub fn record_failure(&self) {
        let failures = self
            .consecutive_failures
            .fetch_add(1, Ordering::Relaxed)
            .saturating_add(1);

        if failures >= self.unhealthy_threshold && self.healthy.swap(false, Ordering::Relaxed) {
            tracing::warn!(failures, "Store connection marked as unhealthy");
            metrics::record_connection_health(false);
        }
    }

    /// True only when unhealthy and the last success is older than the stale window.
    pub fn should_throttle(&self) -> bool {
        if !self.enabled || self.is_healthy() {
            return false;
        }
        self.last_success_at().elapsed() > self.stale_after
    }

    /// Restore the initial healthy state.
    pub fn reset(&self) {
        self.healthy.store(true, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.last_success_ms.store(self.now_ms(), Ordering::Relaxed);
        metrics::record_connection_health(true);
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn last_success_at(&self) -> Instant {
        self.epoch + Duration::from_millis(self.last_success_ms.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn monitor() -> ConnectionHealth {
        ConnectionHealth::new(&HealthConfig::default(), true)
    }

    #[tokio::test(start_paused = true)]
    async fn test_third_failure_flips_unhealthy() {
        let health = monitor();
        health.record_failure();
        health.record_failure();
        assert!(health.is_healthy());

        health.record_failure();
        assert!(!health.is_healthy());
        assert_eq!(health.consecutive_failures(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_counter() {
        let health = monitor();
        health.record_failure();
        health.record_failure();
        health.record_success();
        assert_eq!(health.consecutive_failures(), 0);

        health.record_failure();
        health.record_failure();
        assert!(health.is_healthy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_needs_unhealthy_and_stale() {
        let health = monitor();
        for _ in 0..3 {
            health.record_failure();
        }
        // Unhealthy but the last success is recent.
        assert!(!health.should_throttle());

        advance(Duration::from_millis(60_000)).await;
        assert!(!health.should_throttle());

        advance(Duration::from_millis(1)).await;
        assert!(health.should_throttle());

        health.record_success();
        assert!(!health.should_throttle());
        assert!(health.is_healthy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_but_healthy_does_not_throttle() {
        let health = monitor();
        advance(Duration::from_secs(600)).await;
        assert!(!health.should_throttle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_never_throttles() {
        let health = ConnectionHealth::new(&HealthConfig::default(), false);
        for _ in 0..5 {
            health.record_failure();
        }
        advance(Duration::from_secs(120)).await;
        assert!(!health.is_healthy());
        assert!(!health.should_throttle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset() {
        let health = monitor();
        for _ in 0..4 {
            health.record_failure();
        }
        advance(Duration::from_secs(90)).await;
        assert!(health.should_throttle());

        health.reset();
        let state = health.snapshot();
        assert!(state.is_healthy);
        assert_eq!(state.consecutive_failures, 0);
        assert_eq!(state.last_success_at, Instant::now());
        assert!(!health.should_throttle());
    }
}
