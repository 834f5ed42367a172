//! Cleanup of raw strings read from the map UI.
//!
//! Everything here is pure. Values that cannot be interpreted become the
//! empty string, which downstream code treats as "unknown".

use std::sync::LazyLock;

use mapleads_core::Normalizer;
use regex::Regex;

/// Words that mark the number before them as a review count.
///
/// Labels in other locales are left without a review count.
pub const REVIEW_KEYWORDS: [&str; 6] = [
    "reviews",
    "avis",
    "recenzii",
    "bewertungen",
    "bewertung",
    "review",
];

static RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)").expect("valid rating regex"));

static REVIEWS_RE: LazyLock<Regex> = LazyLock::new(|| {
    let keywords = REVIEW_KEYWORDS.join("|");
    Regex::new(&format!(r"(?i)([0-9][0-9,.]*)\s*(?:{keywords})")).expect("valid reviews regex")
});

/// Rating and review count parsed from one star-rating label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingSummary {
    pub rating: String,
    pub review_count: String,
}

/// Splits a label such as `"4.5 stars 1,234 reviews"` into its rating and
/// review count.
///
/// The rating is the first numeric token. The review count is the number
/// directly preceding a review keyword, with `,` separators removed.
#[must_use]
pub fn parse_rating_and_reviews(raw: Option<&str>) -> RatingSummary {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return RatingSummary::default();
    };

    let rating = RATING_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let review_count = REVIEWS_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().replace(',', ""))
        .unwrap_or_default();

    RatingSummary {
        rating,
        review_count,
    }
}

/// Removes the `Phone:` label and bidi control characters from a phone value.
#[must_use]
pub fn clean_phone(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    raw.replace("Phone:", "")
        .chars()
        .filter(|c| !is_directional_mark(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_directional_mark(c: char) -> bool {
    matches!(c, '\u{200e}' | '\u{200f}' | '\u{202a}'..='\u{202e}' | '\u{2066}'..='\u{2069}')
}

/// Returns the trimmed value when it is an absolute `http`/`https` URL with a host.
///
/// Relative links such as `/maps/place/...` and other schemes are rejected.
#[must_use]
pub fn accept_website(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed).ok()?;
    let is_http = matches!(parsed.scheme(), "http" | "https");
    (is_http && parsed.host_str().is_some_and(|h| !h.is_empty())).then(|| trimmed.to_string())
}

/// Applies a chain's [`Normalizer`] to one candidate value.
#[must_use]
pub fn normalize_value(normalizer: Normalizer, raw: &str) -> String {
    match normalizer {
        Normalizer::Trim => raw.trim().to_string(),
        Normalizer::Phone => clean_phone(Some(raw)),
        Normalizer::AbsoluteUrl => accept_website(raw).unwrap_or_default(),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
