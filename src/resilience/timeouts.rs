//! Timeout enforcement.
//!
//! # Responsibilities
//! - Race a store call against its deadline
//! - Turn a stall into `SyncError::Timeout`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - On expiry the pending future is dropped. That cancels our wait, not the
//!   remote side: a write may still land after the caller has moved on
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::error::SyncError;

/// Run `fut` with a deadline, converting its error into `SyncError`.
pub async fn with_timeout<T, E, F>(deadline: Duration, fut: F) -> Result<T, SyncError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<SyncError>,
{
    match timeout(deadline, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
            let after_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(after_ms, "Store call timed out");
            Err(SyncError::Timeout { after_ms })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::classify::FailureClass;
    use crate::store::StoreError;

    #[tokio::test(start_paused = true)]
    async fn test_fast_call_wins() {
        let result = with_timeout(Duration::from_secs(10), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, StoreError>(7)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stall_becomes_timeout() {
        let started = tokio::time::Instant::now();
        let result = with_timeout(Duration::from_secs(25), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, StoreError>(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, SyncError::Timeout { after_ms: 25_000 }));
        assert_eq!(err.class(), FailureClass::Timeout);
        assert_eq!(started.elapsed(), Duration::from_secs(25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_inner_error_passes_through() {
        let result: Result<(), _> = with_timeout(Duration::from_secs(1), async {
            Err(StoreError::with_code("already-exists", "duplicate"))
        })
        .await;
        match result.unwrap_err() {
            SyncError::Store(e) => assert_eq!(e.code.as_deref(), Some("already-exists")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
