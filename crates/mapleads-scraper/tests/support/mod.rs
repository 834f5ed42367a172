//! Scripted in-memory [`MapPage`] shared by the integration tests.
//!
//! Scoped reads go through the same attach-polling as the Chromium page, so
//! a missing element costs the read timeout and a late element is found once
//! it appears. Everything else returns immediately; slow reads are simulated
//! by returning [`BrowserError::Timeout`] rather than by waiting.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use mapleads_core::{BusinessRecord, RecordSink, SelectorConfig};
use mapleads_scraper::browser::poll_until_found;
use mapleads_scraper::{BrowserError, MapPage, ResultCard, Scope};
use tokio::time::Instant;

pub const FAKE_TIMEOUT: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub text: Option<String>,
    pub attributes: HashMap<String, String>,
    pub times_out: bool,
    /// Delay after page creation before the element attaches.
    pub appears_after: Option<Duration>,
}

impl FakeElement {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn with_attr(name: &str, value: &str) -> Self {
        Self::default().attr(name, value)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn appearing_after(mut self, delay: Duration) -> Self {
        self.appears_after = Some(delay);
        self
    }

    pub fn timing_out() -> Self {
        Self {
            times_out: true,
            ..Self::default()
        }
    }
}

/// One feed row plus the detail panel shown while it is open.
#[derive(Debug, Clone)]
pub struct FakeCard {
    inside: HashMap<String, FakeElement>,
    detail: HashMap<String, FakeElement>,
    panel_renders: bool,
    open_fails: bool,
}

impl FakeCard {
    pub fn new() -> Self {
        Self {
            inside: HashMap::new(),
            detail: HashMap::new(),
            panel_renders: true,
            open_fails: false,
        }
    }

    /// A card labelled `label` whose panel shows the given fields.
    pub fn listing(label: &str, detail_name: &str, phone_label: &str, website: &str) -> Self {
        let mut card =
            Self::new().inside("a.hfpxzc", FakeElement::with_attr("aria-label", label));
        if !detail_name.is_empty() {
            card = card.detail("div[role='main'] h1", FakeElement::with_text(detail_name));
        }
        if !phone_label.is_empty() {
            card = card.detail(
                "button[aria-label*='Phone']",
                FakeElement::with_attr("aria-label", phone_label),
            );
        }
        if !website.is_empty() {
            card = card.detail(
                "a[aria-label*='Website']",
                FakeElement::with_attr("href", website),
            );
        }
        card
    }

    pub fn inside(mut self, selector: &str, element: FakeElement) -> Self {
        self.inside.insert(selector.to_string(), element);
        self
    }

    pub fn detail(mut self, selector: &str, element: FakeElement) -> Self {
        self.detail.insert(selector.to_string(), element);
        self
    }

    pub fn panel_missing(mut self) -> Self {
        self.panel_renders = false;
        self
    }

    pub fn unclickable(mut self) -> Self {
        self.open_fails = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GotoOutcome {
    Loaded,
    TimedOut,
    Failed,
}

/// What the code under test asked the page to do.
#[derive(Debug, Clone, Default)]
pub struct Calls {
    pub goto: usize,
    pub count_reads: usize,
    pub scrolls: usize,
    pub fills: Vec<String>,
    pub clicks: Vec<String>,
    pub opened: Vec<usize>,
}

struct State {
    created: Instant,
    stall_counts: bool,
    card_selector: String,
    panel_selector: String,
    visible: HashSet<String>,
    document: HashMap<String, FakeElement>,
    cards: Vec<FakeCard>,
    count_reads: VecDeque<Option<usize>>,
    goto_script: VecDeque<GotoOutcome>,
    open: Option<usize>,
    calls: Calls,
}

pub struct FakePage {
    state: Mutex<State>,
}

impl FakePage {
    pub fn new() -> Self {
        let selectors = SelectorConfig::default();
        Self {
            state: Mutex::new(State {
                created: Instant::now(),
                stall_counts: false,
                card_selector: selectors.result_card,
                panel_selector: selectors.detail_panel,
                visible: HashSet::new(),
                document: HashMap::new(),
                cards: Vec::new(),
                count_reads: VecDeque::new(),
                goto_script: VecDeque::new(),
                open: None,
                calls: Calls::default(),
            }),
        }
    }

    /// A page on which the default search sequence succeeds.
    pub fn search_ready() -> Self {
        let selectors = SelectorConfig::default();
        Self::new()
            .with_visible(&selectors.search_input)
            .with_visible(&selectors.search_button)
            .with_visible(&selectors.feed)
    }

    pub fn with_visible(self, selector: &str) -> Self {
        self.lock().visible.insert(selector.to_string());
        self
    }

    pub fn with_document(self, selector: &str, element: FakeElement) -> Self {
        self.lock().document.insert(selector.to_string(), element);
        self
    }

    pub fn with_cards(self, cards: Vec<FakeCard>) -> Self {
        self.lock().cards = cards;
        self
    }

    /// Scripted results of successive card counts. Once exhausted, counts
    /// report the number of configured cards.
    pub fn with_counts(self, counts: &[usize]) -> Self {
        self.lock().count_reads = counts.iter().copied().map(Some).collect();
        self
    }

    /// Like [`FakePage::with_counts`]; `None` makes that read fail.
    pub fn with_count_reads(self, reads: &[Option<usize>]) -> Self {
        self.lock().count_reads = reads.iter().copied().collect();
        self
    }

    /// Every card count hangs for a minute before answering.
    pub fn with_stalled_counts(self) -> Self {
        self.lock().stall_counts = true;
        self
    }

    /// Scripted navigation outcomes. Once exhausted, navigation succeeds.
    pub fn with_goto(self, outcomes: &[GotoOutcome]) -> Self {
        self.lock().goto_script = outcomes.iter().copied().collect();
        self
    }

    /// Marks `index` as the open card, as if it had been clicked.
    pub fn with_open_card(self, index: usize) -> Self {
        self.lock().open = Some(index);
        self
    }

    pub fn calls(&self) -> Calls {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("fake page state poisoned")
    }

    fn do_goto(&self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        let mut state = self.lock();
        state.calls.goto += 1;
        match state.goto_script.pop_front().unwrap_or(GotoOutcome::Loaded) {
            GotoOutcome::Loaded => {
                state.open = None;
                Ok(())
            }
            GotoOutcome::TimedOut => Err(BrowserError::timeout(format!("navigate to {url}"), timeout)),
            GotoOutcome::Failed => Err(BrowserError::Script {
                context: format!("navigate to {url}"),
                reason: "net::ERR_CONNECTION_RESET".to_string(),
            }),
        }
    }

    fn do_wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        let state = self.lock();
        if selector == state.panel_selector {
            if let Some(card) = state.open.and_then(|idx| state.cards.get(idx)) {
                return if card.panel_renders {
                    Ok(())
                } else {
                    Err(BrowserError::timeout(format!("wait for {selector}"), timeout))
                };
            }
        }
        if state.visible.contains(selector) {
            Ok(())
        } else {
            Err(BrowserError::timeout(format!("wait for {selector}"), timeout))
        }
    }

    fn do_count(&self, selector: &str) -> Result<usize, BrowserError> {
        let mut state = self.lock();
        if selector != state.card_selector {
            return Ok(usize::from(state.document.contains_key(selector)));
        }
        state.calls.count_reads += 1;
        match state.count_reads.pop_front() {
            Some(Some(count)) => Ok(count),
            Some(None) => Err(BrowserError::Script {
                context: format!("count of {selector}"),
                reason: "execution context was destroyed".to_string(),
            }),
            None => Ok(state.cards.len()),
        }
    }

    fn element(
        &self,
        scope: Scope<'_>,
        selector: &str,
        timeout: Duration,
    ) -> Result<FakeElement, BrowserError> {
        let state = self.lock();
        let found = match scope {
            Scope::Document => state
                .open
                .and_then(|idx| state.cards.get(idx))
                .and_then(|card| card.detail.get(selector))
                .or_else(|| state.document.get(selector)),
            Scope::Card { card, .. } => state
                .cards
                .get(card.index)
                .and_then(|c| c.inside.get(selector)),
        };
        let attached = |element: &FakeElement| {
            element
                .appears_after
                .is_none_or(|delay| state.created.elapsed() >= delay)
        };
        match found {
            Some(element) if !attached(element) => Err(BrowserError::not_found(selector)),
            Some(element) if element.times_out => {
                Err(BrowserError::timeout(format!("read {selector}"), timeout))
            }
            Some(element) => Ok(element.clone()),
            None => Err(BrowserError::not_found(selector)),
        }
    }

    fn do_fill(&self, selector: &str, value: &str) -> Result<(), BrowserError> {
        let mut state = self.lock();
        if !state.visible.contains(selector) {
            return Err(BrowserError::not_found(selector));
        }
        state.calls.fills.push(value.to_string());
        Ok(())
    }

    fn do_click(&self, selector: &str) -> Result<(), BrowserError> {
        let mut state = self.lock();
        if !state.visible.contains(selector) {
            return Err(BrowserError::not_found(selector));
        }
        state.calls.clicks.push(selector.to_string());
        Ok(())
    }

    fn do_open_card(&self, card: ResultCard, timeout: Duration) -> Result<(), BrowserError> {
        let mut state = self.lock();
        state.calls.opened.push(card.index);
        match state.cards.get(card.index) {
            None => Err(BrowserError::not_found(format!("card #{}", card.index))),
            Some(c) if c.open_fails => Err(BrowserError::timeout(
                format!("open card #{}", card.index),
                timeout,
            )),
            Some(_) => {
                state.open = Some(card.index);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl MapPage for FakePage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.do_goto(url, timeout)
    }

    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.do_wait_for_visible(selector, timeout)
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn count(&self, selector: &str) -> Result<usize, BrowserError> {
        let stalled = self.lock().stall_counts;
        if stalled {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        self.do_count(selector)
    }

    async fn text(
        &self,
        scope: Scope<'_>,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<String>, BrowserError> {
        poll_until_found(&format!("read text of {selector}"), timeout, || async {
            self.element(scope, selector, timeout).map(|el| el.text)
        })
        .await
    }

    async fn attribute(
        &self,
        scope: Scope<'_>,
        selector: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<String>, BrowserError> {
        poll_until_found(&format!("read {name} of {selector}"), timeout, || async {
            self.element(scope, selector, timeout)
                .map(|el| el.attributes.get(name).cloned())
        })
        .await
    }

    async fn fill(&self, selector: &str, value: &str, _timeout: Duration) -> Result<(), BrowserError> {
        self.do_fill(selector, value)
    }

    async fn click(&self, selector: &str, _timeout: Duration) -> Result<(), BrowserError> {
        self.do_click(selector)
    }

    async fn open_card(
        &self,
        _card_selector: &str,
        card: ResultCard,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.do_open_card(card, timeout)
    }

    async fn scroll_to_end(&self, _selector: &str) -> Result<(), BrowserError> {
        self.lock().calls.scrolls += 1;
        Ok(())
    }
}

/// Sink that keeps every batch in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub batches: Vec<Vec<BusinessRecord>>,
}

impl RecordSink for MemorySink {
    type Error = std::io::Error;

    fn write_all(&mut self, records: &[BusinessRecord]) -> Result<usize, Self::Error> {
        self.batches.push(records.to_vec());
        Ok(records.len())
    }
}

/// Sink whose every write fails.
#[derive(Debug, Default)]
pub struct BrokenSink;

impl RecordSink for BrokenSink {
    type Error = std::io::Error;

    fn write_all(&mut self, _records: &[BusinessRecord]) -> Result<usize, Self::Error> {
        Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "leads.csv is read-only",
        ))
    }
}
