//! Karobar sync layer.
//!
//! Resilient access to the remote ledger store: failure classification,
//! per-call deadlines, bounded retries with linear backoff, a connection
//! health monitor that throttles a degraded link, typed CRUD over customers,
//! transaction entries and profiles, and cross-screen invalidation signals.

// Boundary to the remote store
pub mod store;

// Call pipeline
pub mod health;
pub mod resilience;

// Domain surface
pub mod gateway;
pub mod invalidation;
pub mod ledger;

// Cross-cutting concerns
pub mod config;
pub mod context;
pub mod error;
pub mod observability;

pub use config::SyncConfig;
pub use context::SyncContext;
pub use error::{SyncError, SyncResult};
pub use gateway::Gateway;
pub use store::{DocumentStore, MemoryStore};
