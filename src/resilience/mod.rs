//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Store call from the gateway:
//!     → retries.rs (attempt loop, linear backoff between attempts)
//!     → timeouts.rs (enforce the per-attempt deadline)
//!     → On failure: classify.rs (Timeout / Network / Auth / Permanent / Unknown)
//!     → Permanent stops the loop, anything else is retried until exhausted
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every store call has a deadline
//! - Permanent failures are never retried
//! - Backoff is linear, tuned per platform through the profile

pub mod backoff;
pub mod classify;
pub mod retries;
pub mod timeouts;

pub use classify::FailureClass;
pub use retries::RetryPolicy;
