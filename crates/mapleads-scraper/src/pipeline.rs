//! End-to-end extraction run: search, load the feed, extract, persist.

use std::time::Duration;

use mapleads_core::{AppConfig, RecordSink, SearchQuery, SelectorConfig};

use crate::browser::MapPage;
use crate::error::ScraperError;
use crate::extract::{BusinessExtractor, ExtractTimeouts};
use crate::feed::{scroll_until_stable, ScrollLimits, ScrollOutcome};
use crate::navigate::{navigate, NavigationPolicy};
use crate::pacing::Pacing;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub search_url: String,
    /// Full search sequences tried before the run is abandoned.
    pub search_attempts: u32,
    pub navigation: NavigationPolicy,
    /// Budget for each search-box interaction and for the feed to appear.
    pub search_ui_timeout: Duration,
    pub scroll: ScrollLimits,
    pub extract: ExtractTimeouts,
    pub pacing: Pacing,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let defaults = Self::default();
        Self {
            search_url: config.search_url.clone(),
            search_attempts: config.search_attempts,
            navigation: NavigationPolicy {
                max_retries: config.nav_max_retries,
                timeout: Duration::from_millis(config.nav_timeout_ms),
            },
            scroll: ScrollLimits {
                max_results: config.max_results,
                stale_limit: config.stale_scroll_limit,
                ceiling: Duration::from_secs(config.scroll_timeout_secs),
                ..defaults.scroll
            },
            ..defaults
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            search_url: "https://www.google.com/maps".to_string(),
            search_attempts: 2,
            navigation: NavigationPolicy::default(),
            search_ui_timeout: Duration::from_secs(15),
            scroll: ScrollLimits::default(),
            extract: ExtractTimeouts::default(),
            pacing: Pacing::live(),
        }
    }
}

/// Counts reported at the end of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub scroll: ScrollOutcome,
    pub extracted: usize,
    /// Rows handed to the sink and persisted.
    pub written: usize,
}

pub struct ExtractionPipeline<'a, P: ?Sized> {
    page: &'a P,
    selectors: &'a SelectorConfig,
    settings: &'a PipelineSettings,
}

impl<'a, P> ExtractionPipeline<'a, P>
where
    P: MapPage + ?Sized,
{
    #[must_use]
    pub fn new(page: &'a P, selectors: &'a SelectorConfig, settings: &'a PipelineSettings) -> Self {
        Self {
            page,
            selectors,
            settings,
        }
    }

    /// Runs one search and writes every extracted listing to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::SearchFailed`] when no search attempt reaches
    /// the result feed, and [`ScraperError::Sink`] when persisting fails.
    /// Per-listing failures are logged and skipped.
    pub async fn run<S>(&self, query: &SearchQuery, sink: &mut S) -> Result<RunSummary, ScraperError>
    where
        S: RecordSink,
    {
        tracing::info!(query = %query.search_text(), "starting extraction run");

        self.search(query).await?;
        self.settings.pacing.settle.wait().await;

        let scroll = scroll_until_stable(
            self.page,
            &self.selectors.feed,
            &self.selectors.result_card,
            self.settings.scroll,
            self.settings.pacing.scroll,
        )
        .await;

        let extractor = BusinessExtractor::new(
            self.page,
            self.selectors,
            self.settings.extract,
            self.settings.pacing.detail,
        );
        let records = extractor.extract_all().await;

        let written = sink.write_all(&records).map_err(|e| ScraperError::Sink {
            source: Box::new(e),
        })?;

        tracing::info!(
            loaded = scroll.final_count,
            extracted = records.len(),
            written,
            "extraction run finished"
        );

        Ok(RunSummary {
            scroll,
            extracted: records.len(),
            written,
        })
    }

    /// Submits the query, retrying the whole sequence up to
    /// `search_attempts` times.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::SearchFailed`] once every attempt has failed.
    pub async fn search(&self, query: &SearchQuery) -> Result<(), ScraperError> {
        let attempts = self.settings.search_attempts.max(1);
        for attempt in 1..=attempts {
            match self.try_search(query).await {
                Ok(()) => {
                    tracing::info!(attempt, "search results loaded");
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(attempt, attempts, error = %err, "search attempt failed");
                }
            }
        }

        Err(ScraperError::SearchFailed {
            query: query.search_text(),
            attempts,
        })
    }

    async fn try_search(&self, query: &SearchQuery) -> Result<(), ScraperError> {
        let url = &self.settings.search_url;
        if !navigate(self.page, url, self.settings.navigation).await {
            return Err(ScraperError::Navigation {
                url: url.clone(),
                attempts: self.settings.navigation.max_retries.max(1),
            });
        }

        let ui = self.settings.search_ui_timeout;
        let selectors = self.selectors;
        self.page.wait_for_visible(&selectors.search_input, ui).await?;
        self.page
            .fill(&selectors.search_input, &query.search_text(), ui)
            .await?;
        self.page.click(&selectors.search_button, ui).await?;
        self.page.wait_for_visible(&selectors.feed, ui).await?;
        Ok(())
    }
}
