//! Linear backoff between retry attempts.

use std::time::Duration;

/// Delay before the given 1-based attempt: `(attempt - 1) * base`.
///
/// The first attempt never waits; attempt 2 waits `base`, attempt 3 waits
/// `2 * base`, and so on.
pub fn calculate_backoff(attempt: u32, base: Duration) -> Duration {
    if attempt <= 1 {
        return Duration::ZERO;
    }
    base.saturating_mul(attempt - 1)
}
