//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway, retry policy, health monitor, invalidation signals produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges)
//! ```

pub mod logging;
pub mod metrics;
