//! Cross-screen invalidation.
//!
//! # Data Flow
//! ```text
//! Successful mutation through the gateway
//!     → signals.rs stamps the topic(s), raises "needs data refresh"
//!     → subscribers are woken (push)
//!
//! Screen becomes visible
//!     → watermark.rs compares its last fetch with the topic stamp (poll)
//!     → stale: refetch, then mark_fetched
//! ```
//!
//! # Design Decisions
//! - Latest value per topic, last write wins; no ordering across topics
//! - Dirty flags, not a queue: missed intermediate stamps are irrelevant
//! - Local to one running instance; lost on restart

pub mod signals;
pub mod watermark;

pub use signals::{InvalidationSignals, Topic};
pub use watermark::CacheWatermark;
