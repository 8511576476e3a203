//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and returns every
//! problem found rather than stopping at the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{Platform, SyncConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &SyncConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for platform in [Platform::Android, Platform::Ios, Platform::Web] {
        let profile = config.profiles.for_platform(platform);
        if profile.timeout_ms == 0 {
            errors.push(ValidationError::new(
                format!("profiles.{}.timeout_ms", platform),
                "must be greater than zero",
            ));
        }
    }

    if config.health.unhealthy_threshold == 0 {
        errors.push(ValidationError::new(
            "health.unhealthy_threshold",
            "must be at least 1",
        ));
    }

    if config.store.probe_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "store.probe_timeout_ms",
            "must be greater than zero",
        ));
    }

    if config.observability.log_level.trim().is_empty() {
        errors.push(ValidationError::new(
            "observability.log_level",
            "must not be empty",
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a valid socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
