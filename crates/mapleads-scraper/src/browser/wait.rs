//! Deadline helpers shared by [`super::MapPage`] implementations.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::BrowserError;

/// Interval between element lookups while waiting for an element to attach.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Runs `fut`, converting expiry of `timeout` into [`BrowserError::Timeout`].
///
/// # Errors
///
/// Returns the error produced by `fut`, or [`BrowserError::Timeout`] once
/// `timeout` has elapsed.
pub async fn bounded<T, F>(operation: &str, timeout: Duration, fut: F) -> Result<T, BrowserError>
where
    F: Future<Output = Result<T, BrowserError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(BrowserError::timeout(operation, timeout)),
    }
}

/// Repeats `lookup` every [`POLL_INTERVAL`] while it reports
/// [`BrowserError::NotFound`], until it succeeds or `timeout` runs out.
///
/// Any other error ends the wait immediately. An element that never
/// attaches yields its last `NotFound`; a single lookup that stalls past the
/// deadline yields [`BrowserError::Timeout`].
///
/// # Errors
///
/// Returns the lookup's error as described above.
pub async fn poll_until_found<T, F, Fut>(
    operation: &str,
    timeout: Duration,
    mut lookup: F,
) -> Result<T, BrowserError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BrowserError>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match tokio::time::timeout(remaining, lookup()).await {
            Err(_) => return Err(BrowserError::timeout(operation, timeout)),
            Ok(Err(err @ BrowserError::NotFound { .. })) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(err);
                }
                tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
            }
            Ok(result) => return result,
        }
    }
}
