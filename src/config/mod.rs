//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or defaults
//!     → loader.rs (parse, apply KAROBAR_* env overrides)
//!     → validation.rs (semantic checks)
//!     → SyncConfig (validated, immutable)
//!     → profile for the configured platform resolved once by SyncContext
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Platform differences live in profiles, not at call sites

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::HealthConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::Platform;
pub use schema::PlatformProfile;
pub use schema::RetryConfig;
pub use schema::StoreConfig;
pub use schema::SyncConfig;
