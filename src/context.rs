//! Shared runtime context.
//!
//! Built once at startup from the validated configuration and handed to the
//! gateway and to every screen that reads invalidation signals. Cloning is
//! cheap and clones share the same health monitor and signals.

use std::sync::Arc;

use crate::config::{PlatformProfile, SyncConfig};
use crate::health::ConnectionHealth;
use crate::invalidation::InvalidationSignals;
use crate::resilience::RetryPolicy;

#[derive(Debug, Clone)]
pub struct SyncContext {
    config: Arc<SyncConfig>,
    profile: PlatformProfile,
    retry: RetryPolicy,
    health: Arc<ConnectionHealth>,
    signals: Arc<InvalidationSignals>,
}

impl SyncContext {
    /// Resolve the platform profile and build the shared state.
    pub fn new(config: SyncConfig) -> Self {
        let profile = config.profile().clone();
        let retry = RetryPolicy::from_profile(config.retries.max_retries, &profile);
        let health = ConnectionHealth::new(&config.health, profile.health_monitoring);

        tracing::info!(
            platform = %config.platform,
            timeout_ms = profile.timeout_ms,
            base_delay_ms = profile.base_delay_ms,
            max_retries = retry.max_retries,
            health_monitoring = profile.health_monitoring,
            "Sync context initialized"
        );

        Self {
            config: Arc::new(config),
            profile,
            retry,
            health: Arc::new(health),
            signals: Arc::new(InvalidationSignals::new()),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn health(&self) -> &Arc<ConnectionHealth> {
        &self.health
    }

    pub fn signals(&self) -> &Arc<InvalidationSignals> {
        &self.signals
    }
}

impl Default for SyncContext {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}
