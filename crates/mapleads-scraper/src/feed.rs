//! Incremental loading of the result feed.
//!
//! The feed appends rows as it is scrolled. Scrolling stops on whichever
//! comes first: the result cap, a run of unchanged counts, or the wall-clock
//! ceiling. Every iteration waits on bounded operations only, so the loop
//! always terminates.

use std::time::Duration;

use tokio::time::Instant;

use crate::browser::{bounded, MapPage};
use crate::pacing::DelayRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollLimits {
    /// Stop once at least this many cards are loaded.
    pub max_results: usize,
    /// Consecutive unchanged counts that end scrolling.
    pub stale_limit: u32,
    /// Wall-clock budget for the whole scroll phase.
    pub ceiling: Duration,
    /// How long to wait for the feed container before the first read.
    pub feed_wait: Duration,
    /// Network-idle wait after each scroll; expiry is not an error.
    pub network_idle: Duration,
    /// Budget for a single count or scroll call.
    pub step_timeout: Duration,
}

impl Default for ScrollLimits {
    fn default() -> Self {
        Self {
            max_results: 200,
            stale_limit: 3,
            ceiling: Duration::from_secs(90),
            feed_wait: Duration::from_secs(15),
            network_idle: Duration::from_secs(3),
            step_timeout: Duration::from_secs(5),
        }
    }
}

/// Why scrolling ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollStop {
    ResultCap,
    Stale,
    Ceiling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollOutcome {
    /// Card count observed when scrolling stopped. May undercount what the
    /// feed could still load.
    pub final_count: usize,
    pub stop: ScrollStop,
    /// Number of scroll actions issued.
    pub scrolls: u32,
}

struct ScrollState {
    last_observed_count: usize,
    stale_rounds: u32,
    started: Instant,
}

impl ScrollState {
    fn new() -> Self {
        Self {
            last_observed_count: 0,
            stale_rounds: 0,
            started: Instant::now(),
        }
    }

    fn observe(&mut self, count: usize) {
        if count == self.last_observed_count {
            self.stale_rounds += 1;
        } else {
            self.stale_rounds = 0;
        }
        self.last_observed_count = count;
    }
}

/// Scrolls the feed until it stops growing, the cap is reached, or the
/// ceiling expires, and returns the final card count.
///
/// A failed or stalled count read is treated as an unchanged count.
pub async fn scroll_until_stable<P>(
    page: &P,
    feed_selector: &str,
    card_selector: &str,
    limits: ScrollLimits,
    jitter: DelayRange,
) -> ScrollOutcome
where
    P: MapPage + ?Sized,
{
    if let Err(err) = page.wait_for_visible(feed_selector, limits.feed_wait).await {
        tracing::warn!(error = %err, "result feed not visible, scrolling anyway");
    }

    let mut state = ScrollState::new();
    let mut scrolls = 0u32;

    loop {
        let read = bounded("count cards", limits.step_timeout, page.count(card_selector));
        let count = match read.await {
            Ok(count) => count,
            Err(err) => {
                tracing::debug!(error = %err, "card count failed, treating as unchanged");
                state.last_observed_count
            }
        };

        if count >= limits.max_results {
            return finish(count, ScrollStop::ResultCap, scrolls);
        }

        state.observe(count);

        if state.stale_rounds >= limits.stale_limit {
            return finish(count, ScrollStop::Stale, scrolls);
        }

        if state.started.elapsed() > limits.ceiling {
            return finish(count, ScrollStop::Ceiling, scrolls);
        }

        if let Err(err) =
            bounded("scroll feed", limits.step_timeout, page.scroll_to_end(feed_selector)).await
        {
            tracing::debug!(error = %err, "feed scroll failed");
        }
        scrolls += 1;

        jitter.wait().await;

        if let Err(err) = page.wait_for_network_idle(limits.network_idle).await {
            tracing::debug!(error = %err, "network did not settle after scroll");
        }
    }
}

fn finish(final_count: usize, stop: ScrollStop, scrolls: u32) -> ScrollOutcome {
    tracing::info!(final_count, ?stop, scrolls, "feed scrolling finished");
    ScrollOutcome {
        final_count,
        stop,
        scrolls,
    }
}
