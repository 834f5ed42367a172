//! Ordered-fallback field resolution.
//!
//! A [`StrategyChain`] is evaluated front to back. Each strategy produces an
//! explicit [`Lookup`]; misses and timeouts fall through to the next strategy
//! and are only logged at debug level, since a listing lacking a field is
//! normal. The first non-empty normalized value wins.

use std::time::Duration;

use mapleads_core::{ExtractionStrategy, ReadMode, StrategyChain};

use crate::browser::{MapPage, Scope};
use crate::error::BrowserError;
use crate::normalize::normalize_value;

/// Outcome of one extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// A non-empty raw value.
    Found(String),
    /// The element is missing, or present without a usable value.
    NotFound,
    TimedOut,
}

impl Lookup {
    fn from_read(result: Result<Option<String>, BrowserError>) -> Self {
        match result {
            Ok(Some(value)) if !value.trim().is_empty() => Self::Found(value),
            Ok(_) => Self::NotFound,
            Err(err) if err.is_timeout() => Self::TimedOut,
            Err(_) => Self::NotFound,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<String> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound | Self::TimedOut => None,
        }
    }
}

/// Runs a single strategy against `scope`.
///
/// For [`ReadMode::AttributeOrText`], element text is read only when the
/// element exists but the attribute is empty or absent.
pub async fn attempt<P>(
    page: &P,
    scope: Scope<'_>,
    strategy: &ExtractionStrategy,
    timeout: Duration,
) -> Lookup
where
    P: MapPage + ?Sized,
{
    let selector = strategy.selector.as_str();
    match &strategy.read {
        ReadMode::Text => Lookup::from_read(page.text(scope, selector, timeout).await),
        ReadMode::Attribute { name } => {
            Lookup::from_read(page.attribute(scope, selector, name, timeout).await)
        }
        ReadMode::AttributeOrText { name } => {
            match page.attribute(scope, selector, name, timeout).await {
                Ok(Some(value)) if !value.trim().is_empty() => Lookup::Found(value),
                Ok(_) => Lookup::from_read(page.text(scope, selector, timeout).await),
                Err(err) => Lookup::from_read(Err(err)),
            }
        }
    }
}

/// Resolves one field: the first non-empty normalized value from `chain`,
/// or the empty string when every strategy misses.
pub async fn resolve<P>(
    page: &P,
    scope: Scope<'_>,
    chain: &StrategyChain,
    timeout: Duration,
) -> String
where
    P: MapPage + ?Sized,
{
    for (idx, strategy) in chain.strategies.iter().enumerate() {
        match attempt(page, scope, strategy, timeout).await {
            Lookup::Found(raw) => {
                let value = normalize_value(chain.normalize, &raw);
                if !value.is_empty() {
                    return value;
                }
                tracing::debug!(
                    strategy = idx,
                    selector = %strategy.selector,
                    "value rejected by normalizer"
                );
            }
            Lookup::NotFound => {
                tracing::debug!(strategy = idx, selector = %strategy.selector, "no match");
            }
            Lookup::TimedOut => {
                tracing::debug!(strategy = idx, selector = %strategy.selector, "read timed out");
            }
        }
    }
    String::new()
}
