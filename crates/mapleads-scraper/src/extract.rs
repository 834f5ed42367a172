//! Per-listing detail extraction.

use std::time::Duration;

use mapleads_core::{BusinessRecord, SelectorConfig};

use crate::browser::{MapPage, ResultCard, Scope};
use crate::error::BrowserError;
use crate::normalize::{parse_rating_and_reviews, RatingSummary};
use crate::pacing::DelayRange;
use crate::resolver::resolve;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractTimeouts {
    /// Per-strategy budget for one field read.
    pub field_read: Duration,
    /// Scroll-into-view plus click on a result card.
    pub card_open: Duration,
    /// Wait for the detail panel after opening a card. Expiry is tolerated.
    pub detail_render: Duration,
}

impl Default for ExtractTimeouts {
    fn default() -> Self {
        Self {
            field_read: Duration::from_secs(3),
            card_open: Duration::from_secs(15),
            detail_render: Duration::from_secs(5),
        }
    }
}

/// Opens result cards one at a time and reads their detail panels.
pub struct BusinessExtractor<'a, P: ?Sized> {
    page: &'a P,
    selectors: &'a SelectorConfig,
    timeouts: ExtractTimeouts,
    detail_jitter: DelayRange,
}

impl<'a, P> BusinessExtractor<'a, P>
where
    P: MapPage + ?Sized,
{
    #[must_use]
    pub fn new(
        page: &'a P,
        selectors: &'a SelectorConfig,
        timeouts: ExtractTimeouts,
        detail_jitter: DelayRange,
    ) -> Self {
        Self {
            page,
            selectors,
            timeouts,
            detail_jitter,
        }
    }

    /// Name shown on the card itself, used when the detail panel has no heading.
    pub async fn card_label(&self, card: ResultCard) -> String {
        let scope = Scope::Card {
            selector: &self.selectors.result_card,
            card,
        };
        resolve(
            self.page,
            scope,
            &self.selectors.card_name,
            self.timeouts.field_read,
        )
        .await
    }

    /// Opens `card` and reads its detail panel.
    ///
    /// Missing fields come back empty. An empty detail-panel name is replaced
    /// by `fallback_name`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] only when the card cannot be opened.
    pub async fn extract_one(
        &self,
        card: ResultCard,
        fallback_name: &str,
    ) -> Result<BusinessRecord, BrowserError> {
        self.page
            .open_card(&self.selectors.result_card, card, self.timeouts.card_open)
            .await?;

        self.detail_jitter.wait().await;

        if let Err(err) = self
            .page
            .wait_for_visible(&self.selectors.detail_panel, self.timeouts.detail_render)
            .await
        {
            tracing::debug!(
                card = card.index,
                error = %err,
                "detail panel not rendered, reading what is available"
            );
        }

        let timeout = self.timeouts.field_read;
        let scope = Scope::Document;

        let mut name = resolve(self.page, scope, &self.selectors.name, timeout).await;
        if name.is_empty() {
            name = fallback_name.trim().to_string();
        }
        let phone = resolve(self.page, scope, &self.selectors.phone, timeout).await;
        let website = resolve(self.page, scope, &self.selectors.website, timeout).await;
        let rating_label = resolve(self.page, scope, &self.selectors.rating, timeout).await;
        let RatingSummary {
            rating,
            review_count,
        } = parse_rating_and_reviews(Some(&rating_label));

        Ok(BusinessRecord {
            name,
            phone,
            website,
            rating,
            review_count,
        })
    }

    /// Extracts every card currently in the feed, in feed order.
    ///
    /// A card that cannot be opened is skipped with a warning; the remaining
    /// cards are still processed.
    pub async fn extract_all(&self) -> Vec<BusinessRecord> {
        let total = match self.page.count(&self.selectors.result_card).await {
            Ok(total) => total,
            Err(err) => {
                tracing::warn!(error = %err, "could not count result cards");
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(total);
        for index in 0..total {
            let card = ResultCard { index };
            let fallback = self.card_label(card).await;
            match self.extract_one(card, &fallback).await {
                Ok(record) => {
                    tracing::debug!(card = index, name = %record.name, "listing extracted");
                    records.push(record);
                }
                Err(err) => {
                    tracing::warn!(card = index, error = %err, "skipping result card");
                }
            }
        }

        tracing::info!(
            extracted = records.len(),
            skipped = total - records.len(),
            "extraction finished"
        );
        records
    }
}
