//! Connection health subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway call finished
//!     → record_success() / record_failure()
//!     → state.rs updates counters and the healthy flag
//!
//! Gateway call starting
//!     → should_throttle()
//!     → true: gateway sleeps the throttle delay first
//! ```
//!
//! # Design Decisions
//! - One monitor per SyncContext, shared by every gateway call
//! - Lost on restart; nothing is persisted

pub mod state;

pub use state::{ConnectionHealth, ConnectionHealthState};
