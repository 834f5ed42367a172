//! Page navigation with bounded retries.
//!
//! Failures never propagate from [`navigate`]; callers receive `false` once
//! the attempt budget is spent and apply their own policy.

use std::time::Duration;

use crate::browser::MapPage;
use crate::error::BrowserError;

/// Step of the linear backoff applied after a navigation timeout.
const TIMEOUT_BACKOFF_STEP: Duration = Duration::from_millis(1000);

/// Fixed wait after any other navigation failure.
const FAILURE_BACKOFF: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub max_retries: u32,
    /// Per-attempt navigation timeout.
    pub timeout: Duration,
}

impl Default for NavigationPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Delay before the attempt following the failed `attempt` (0-based).
///
/// | Failure        | Wait                         |
/// |----------------|------------------------------|
/// | timeout        | 1000 ms × (`attempt` + 1)    |
/// | anything else  | 1500 ms                      |
#[must_use]
pub fn backoff_after(err: &BrowserError, attempt: u32) -> Duration {
    if err.is_timeout() {
        TIMEOUT_BACKOFF_STEP.saturating_mul(attempt.saturating_add(1))
    } else {
        FAILURE_BACKOFF
    }
}

/// Navigates `page` to `target`, retrying per `policy`.
///
/// Returns `true` as soon as one attempt succeeds. No wait follows the
/// final failed attempt.
pub async fn navigate<P>(page: &P, target: &str, policy: NavigationPolicy) -> bool
where
    P: MapPage + ?Sized,
{
    let attempts = policy.max_retries.max(1);

    for attempt in 0..attempts {
        match page.goto(target, policy.timeout).await {
            Ok(()) => {
                if attempt > 0 {
                    tracing::info!(target, attempt, "navigation succeeded after retry");
                }
                return true;
            }
            Err(err) => {
                if attempt + 1 >= attempts {
                    tracing::warn!(
                        target,
                        attempts,
                        error = %err,
                        "navigation failed, retry budget exhausted"
                    );
                    return false;
                }
                let delay = backoff_after(&err, attempt);
                tracing::warn!(
                    target,
                    attempt,
                    attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "navigation failed, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    false
}
