//! Selector chains for the map search UI.
//!
//! Map markup differs between business types and locales, so each field is
//! described by an ordered [`StrategyChain`] instead of a single selector.
//! The built-in chains are returned by [`SelectorConfig::default`]; a YAML
//! file can replace any subset of them at startup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// How a strategy reads a value from the element its selector matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReadMode {
    /// The element's rendered text.
    Text,
    /// A named attribute only.
    Attribute { name: String },
    /// A named attribute, falling back to element text when it is empty or absent.
    AttributeOrText { name: String },
}

/// Cleanup applied to every candidate value a chain produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalizer {
    #[default]
    Trim,
    /// Strip the `Phone:` label and bidi embedding marks.
    Phone,
    /// Keep only absolute `http`/`https` URLs.
    AbsoluteUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStrategy {
    pub selector: String,
    #[serde(flatten)]
    pub read: ReadMode,
}

impl ExtractionStrategy {
    #[must_use]
    pub fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            read: ReadMode::Text,
        }
    }

    #[must_use]
    pub fn attribute(selector: &str, name: &str) -> Self {
        Self {
            selector: selector.to_string(),
            read: ReadMode::Attribute {
                name: name.to_string(),
            },
        }
    }

    #[must_use]
    pub fn attribute_or_text(selector: &str, name: &str) -> Self {
        Self {
            selector: selector.to_string(),
            read: ReadMode::AttributeOrText {
                name: name.to_string(),
            },
        }
    }
}

/// Ordered extraction attempts for one logical field. Earlier strategies win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyChain {
    pub strategies: Vec<ExtractionStrategy>,
    #[serde(default)]
    pub normalize: Normalizer,
}

impl StrategyChain {
    #[must_use]
    pub fn new(strategies: Vec<ExtractionStrategy>, normalize: Normalizer) -> Self {
        Self {
            strategies,
            normalize,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorConfig {
    pub search_input: String,
    pub search_button: String,
    /// Scrollable container of the result feed.
    pub feed: String,
    /// One row of the result feed.
    pub result_card: String,
    /// Detail panel shown after a card is opened.
    pub detail_panel: String,
    /// Listing-level label, read inside a result card before it is opened.
    pub card_name: StrategyChain,
    pub name: StrategyChain,
    pub phone: StrategyChain,
    pub website: StrategyChain,
    /// Star-rating element whose label carries rating and review count.
    pub rating: StrategyChain,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            search_input: "input#searchboxinput".to_string(),
            search_button: "button#searchbox-searchbutton".to_string(),
            feed: "div[role='feed']".to_string(),
            result_card: "div[role='article']".to_string(),
            detail_panel: "div[role='main']".to_string(),
            card_name: StrategyChain::new(
                vec![ExtractionStrategy::attribute_or_text("a.hfpxzc", "aria-label")],
                Normalizer::Trim,
            ),
            name: StrategyChain::new(
                vec![
                    ExtractionStrategy::text("div[role='main'] h1"),
                    ExtractionStrategy::text("h1.DUwDvf"),
                    ExtractionStrategy::text("h1.fontHeadlineLarge"),
                    ExtractionStrategy::text("div[role='main'] [aria-level='1']"),
                ],
                Normalizer::Trim,
            ),
            phone: StrategyChain::new(
                vec![
                    ExtractionStrategy::attribute_or_text(
                        "button[aria-label*='Phone']",
                        "aria-label",
                    ),
                    ExtractionStrategy::attribute_or_text(
                        "button[data-item-id^='phone:']",
                        "aria-label",
                    ),
                    ExtractionStrategy::attribute_or_text(
                        "div[role='main'] a[href^='tel:']",
                        "aria-label",
                    ),
                ],
                Normalizer::Phone,
            ),
            website: StrategyChain::new(
                vec![
                    ExtractionStrategy::attribute("a[aria-label*='Website']", "href"),
                    ExtractionStrategy::attribute("a[data-item-id='authority']", "href"),
                    ExtractionStrategy::attribute("a[data-tooltip='Open website']", "href"),
                ],
                Normalizer::AbsoluteUrl,
            ),
            rating: StrategyChain::new(
                vec![
                    ExtractionStrategy::attribute_or_text(
                        "span[role='img'][aria-label*='star']",
                        "aria-label",
                    ),
                    ExtractionStrategy::attribute_or_text(
                        "div[role='main'] span[aria-label*='star']",
                        "aria-label",
                    ),
                ],
                Normalizer::Trim,
            ),
        }
    }
}

/// Load the selector configuration.
///
/// With `path = None` the built-in chains are returned. Otherwise the YAML
/// file at `path` is read; keys it omits keep their built-in values.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_selector_config(path: Option<&Path>) -> Result<SelectorConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(SelectorConfig::default());
    };

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SelectorsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let config: SelectorConfig = serde_yaml::from_str(&content)?;
    validate_selectors(&config)?;
    Ok(config)
}

fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    let plain = [
        ("search_input", &config.search_input),
        ("search_button", &config.search_button),
        ("feed", &config.feed),
        ("result_card", &config.result_card),
        ("detail_panel", &config.detail_panel),
    ];
    for (key, selector) in plain {
        if selector.trim().is_empty() {
            return Err(ConfigError::InvalidSelectors(format!(
                "{key} selector is empty"
            )));
        }
    }

    let chains = [
        ("card_name", &config.card_name),
        ("name", &config.name),
        ("phone", &config.phone),
        ("website", &config.website),
        ("rating", &config.rating),
    ];
    for (key, chain) in chains {
        if chain.strategies.is_empty() {
            return Err(ConfigError::InvalidSelectors(format!(
                "{key} chain has no strategies"
            )));
        }
        for (idx, strategy) in chain.strategies.iter().enumerate() {
            if strategy.selector.trim().is_empty() {
                return Err(ConfigError::InvalidSelectors(format!(
                    "{key} strategy {idx} has an empty selector"
                )));
            }
            if let ReadMode::Attribute { name } | ReadMode::AttributeOrText { name } =
                &strategy.read
            {
                if name.trim().is_empty() {
                    return Err(ConfigError::InvalidSelectors(format!(
                        "{key} strategy {idx} has an empty attribute name"
                    )));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "selectors_test.rs"]
mod tests;
