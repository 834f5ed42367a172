//! Randomized pacing between browser interactions.
//!
//! Delays are drawn uniformly from a [`DelayRange`] so interaction timing has
//! no fixed period. [`Pacing::none`] disables every jittered wait.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const ZERO: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Draws one delay. A degenerate or inverted range yields `min_ms`.
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::random_range(self.min_ms..=self.max_ms))
    }

    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Jitter ranges used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After each feed scroll, before the network-idle wait.
    pub scroll: DelayRange,
    /// After clicking a result card, before waiting for the detail panel.
    pub detail: DelayRange,
    /// After a successful search, before scrolling starts.
    pub settle: DelayRange,
}

impl Pacing {
    #[must_use]
    pub const fn live() -> Self {
        Self {
            scroll: DelayRange::new(1500, 3500),
            detail: DelayRange::new(800, 1600),
            settle: DelayRange::new(2000, 4000),
        }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self {
            scroll: DelayRange::ZERO,
            detail: DelayRange::ZERO,
            settle: DelayRange::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::live()
    }
}
