//! Error type surfaced by gateway operations.

use thiserror::Error;

use crate::resilience::classify::{classify_store_error, FailureClass};
use crate::store::StoreError;

/// Errors that can occur while talking to the document store.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The call did not finish before its deadline. The remote side may
    /// still apply it, so the outcome is unknown rather than aborted.
    #[error("Request timed out after {after_ms} ms. Please try again.")]
    Timeout { after_ms: u64 },

    /// The store rejected or failed the call.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Input rejected before any remote call was made.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A stored document did not have the expected shape.
    #[error("Malformed document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for gateway operations.
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    /// Classify this error for retry and presentation decisions.
    pub fn class(&self) -> FailureClass {
        match self {
            SyncError::Timeout { .. } => FailureClass::Timeout,
            SyncError::Store(e) => classify_store_error(e),
            SyncError::Validation(_) | SyncError::Decode(_) => FailureClass::Permanent,
        }
    }

    /// Text suitable for a dismissible error message.
    pub fn user_message(&self) -> String {
        match self.class() {
            FailureClass::Timeout => "Request timed out. Please try again.".to_string(),
            FailureClass::Network => {
                "Network connection failed. Please check your internet connection.".to_string()
            }
            FailureClass::Auth => "Your session has expired. Please sign in again.".to_string(),
            FailureClass::Permanent | FailureClass::Unknown => match self {
                SyncError::Store(e) => e.message.clone(),
                other => other.to_string(),
            },
        }
    }
}
