//! Browser automation seam.
//!
//! The pipeline drives a single page through [`MapPage`]. Production runs use
//! [`ChromiumSession`]; tests substitute a scripted in-memory page.

mod chromium;
mod stealth;
mod wait;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BrowserError;

pub use chromium::{ChromiumPage, ChromiumSession};
pub use stealth::{pick_user_agent, STEALTH_SCRIPT, USER_AGENTS};
pub use wait::{bounded, poll_until_found, POLL_INTERVAL};

/// One row of the result feed, identified by its position when it was scanned.
///
/// Feed rows are re-rendered while scrolling, so implementations must look
/// the card up by index on every call instead of holding element handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultCard {
    pub index: usize,
}

/// Where a selector is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    Document,
    /// Inside the `card.index`-th element matching `selector`.
    Card { selector: &'a str, card: ResultCard },
}

/// Operations the extraction pipeline needs from a browser page.
///
/// Every call that waits on the page takes an explicit timeout and reports
/// expiry as [`BrowserError::Timeout`]. Scoped reads wait up to their timeout
/// for the element to attach (see [`poll_until_found`]) and report an
/// element that never appears as [`BrowserError::NotFound`].
#[async_trait]
pub trait MapPage: Send + Sync {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Waits until an element matching `selector` is rendered with a non-zero box.
    async fn wait_for_visible(&self, selector: &str, timeout: Duration)
        -> Result<(), BrowserError>;

    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<(), BrowserError>;

    /// Number of elements currently matching `selector`.
    async fn count(&self, selector: &str) -> Result<usize, BrowserError>;

    async fn text(
        &self,
        scope: Scope<'_>,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<String>, BrowserError>;

    async fn attribute(
        &self,
        scope: Scope<'_>,
        selector: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<String>, BrowserError>;

    /// Replaces the value of the input matching `selector` with `value`.
    async fn fill(&self, selector: &str, value: &str, timeout: Duration)
        -> Result<(), BrowserError>;

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Scrolls the card into view and clicks it.
    async fn open_card(
        &self,
        card_selector: &str,
        card: ResultCard,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    /// Scrolls the container matching `selector` to its full height.
    async fn scroll_to_end(&self, selector: &str) -> Result<(), BrowserError>;
}
