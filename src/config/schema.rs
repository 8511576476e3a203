//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the sync layer.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the synchronization layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SyncConfig {
    /// Execution platform; selects which profile applies.
    pub platform: Platform,

    /// Per-platform deadlines, backoff and health monitoring.
    pub profiles: PlatformProfiles,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Connection health thresholds.
    pub health: HealthConfig,

    /// Remote document store settings.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl SyncConfig {
    /// The profile for the configured platform.
    pub fn profile(&self) -> &PlatformProfile {
        self.profiles.for_platform(self.platform)
    }
}

/// Execution platform the application runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    #[default]
    Web,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Web => "web",
        };
        f.write_str(name)
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "web" => Ok(Platform::Web),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

/// Profiles for every supported platform.
///
/// A partial `[profiles.<platform>]` table only replaces the fields it
/// names; the rest keep that platform's own defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(from = "ProfileTables")]
pub struct PlatformProfiles {
    pub android: PlatformProfile,
    pub ios: PlatformProfile,
    pub web: PlatformProfile,
}

impl PlatformProfiles {
    pub fn for_platform(&self, platform: Platform) -> &PlatformProfile {
        match platform {
            Platform::Android => &self.android,
            Platform::Ios => &self.ios,
            Platform::Web => &self.web,
        }
    }
}

impl Default for PlatformProfiles {
    fn default() -> Self {
        Self {
            android: PlatformProfile::android(),
            ios: PlatformProfile::standard(),
            web: PlatformProfile::standard(),
        }
    }
}

/// Raw `[profiles]` section as written in the file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileTables {
    android: ProfileOverrides,
    ios: ProfileOverrides,
    web: ProfileOverrides,
}

impl From<ProfileTables> for PlatformProfiles {
    fn from(tables: ProfileTables) -> Self {
        Self {
            android: tables.android.apply(PlatformProfile::android()),
            ios: tables.ios.apply(PlatformProfile::standard()),
            web: tables.web.apply(PlatformProfile::standard()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProfileOverrides {
    timeout_ms: Option<u64>,
    base_delay_ms: Option<u64>,
    health_monitoring: Option<bool>,
}

impl ProfileOverrides {
    fn apply(self, base: PlatformProfile) -> PlatformProfile {
        PlatformProfile {
            timeout_ms: self.timeout_ms.unwrap_or(base.timeout_ms),
            base_delay_ms: self.base_delay_ms.unwrap_or(base.base_delay_ms),
            health_monitoring: self.health_monitoring.unwrap_or(base.health_monitoring),
        }
    }
}

/// Timing and health behaviour resolved for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlatformProfile {
    /// Deadline for a single remote call in milliseconds.
    pub timeout_ms: u64,

    /// Linear backoff unit between retry attempts in milliseconds.
    pub base_delay_ms: u64,

    /// Whether the connection health monitor may throttle calls.
    pub health_monitoring: bool,
}

impl PlatformProfile {
    /// Long deadline, linear backoff and throttling.
    pub fn android() -> Self {
        Self {
            timeout_ms: 25_000,
            base_delay_ms: 1_000,
            health_monitoring: true,
        }
    }

    /// Shorter deadline, immediate retries, no throttling. Used by ios and web.
    pub fn standard() -> Self {
        Self {
            timeout_ms: 10_000,
            base_delay_ms: 0,
            health_monitoring: false,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self::standard()
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt (2 means up to 3 attempts).
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}

/// Connection health configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Number of consecutive failures before marking the connection unhealthy.
    pub unhealthy_threshold: u32,

    /// How long after the last success an unhealthy connection counts as stale.
    pub stale_after_ms: u64,

    /// Delay inserted before a call while throttling.
    pub throttle_delay_ms: u64,
}

impl HealthConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }

    pub fn throttle_delay(&self) -> Duration {
        Duration::from_millis(self.throttle_delay_ms)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            unhealthy_threshold: 3,
            stale_after_ms: 60_000,
            throttle_delay_ms: 2_000,
        }
    }
}

/// Remote document store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Project the documents belong to.
    pub project_id: String,

    /// API key used by the store client.
    pub api_key: String,

    /// Authentication domain.
    pub auth_domain: String,

    /// Deadline for the connection check in milliseconds.
    pub probe_timeout_ms: u64,

    /// Optional JSON file backing the local document store.
    pub data_path: Option<String>,
}

impl StoreConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Names of required settings that are empty.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_key.trim().is_empty() {
            missing.push("KAROBAR_API_KEY");
        }
        if self.project_id.trim().is_empty() {
            missing.push("KAROBAR_PROJECT_ID");
        }
        missing
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            api_key: String::new(),
            auth_domain: String::new(),
            probe_timeout_ms: 8_000,
            data_path: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
