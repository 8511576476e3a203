//! Failure classification.
//!
//! Store failures arrive as free text plus an optional code, so
//! classification is substring based. Rules are checked in order and the
//! first match wins:
//!
//! ```text
//! "timeout" | "timed out"                       → Timeout
//! "Failed to fetch" | "Network"                 → Network
//! "auth/" | "expired" | "401"                   → Auth
//! "permission" | "not-found" | "already-exists" → Permanent
//! anything else                                 → Unknown
//! ```

use std::fmt;

use crate::store::StoreError;

/// Coarse failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    Timeout,
    Network,
    Auth,
    Permanent,
    Unknown,
}

impl FailureClass {
    /// Only permanent failures are never retried. Auth failures go through
    /// the generic retry path; callers surface them as an expired session.
    pub fn is_retryable(self) -> bool {
        !matches!(self, FailureClass::Permanent)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureClass::Timeout => "timeout",
            FailureClass::Network => "network",
            FailureClass::Auth => "auth",
            FailureClass::Permanent => "permanent",
            FailureClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a raw failure message.
pub fn classify_message(message: &str) -> FailureClass {
    let has = |needle: &str| message.contains(needle);

    if has("timeout") || has("timed out") {
        FailureClass::Timeout
    } else if has("Failed to fetch") || has("Network") {
        FailureClass::Network
    } else if has("auth/") || has("expired") || has("401") {
        FailureClass::Auth
    } else if has("permission") || has("not-found") || has("already-exists") {
        FailureClass::Permanent
    } else {
        FailureClass::Unknown
    }
}

/// Classify a store error using its rendered form, so the code takes part.
pub fn classify_store_error(error: &StoreError) -> FailureClass {
    classify_message(&error.to_string())
}
