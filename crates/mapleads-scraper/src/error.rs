use std::time::Duration;

use chromiumoxide::error::CdpError;
use thiserror::Error;

/// Failures reported by a [`crate::MapPage`] implementation.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("no element matches \"{selector}\"")]
    NotFound { selector: String },

    #[error("CDP error: {0}")]
    Cdp(#[from] CdpError),

    #[error("unexpected script result for {context}: {reason}")]
    Script { context: String, reason: String },
}

impl BrowserError {
    #[must_use]
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    #[must_use]
    pub fn not_found(selector: impl Into<String>) -> Self {
        Self::NotFound {
            selector: selector.into(),
        }
    }

    /// `true` for timeout-class failures, including CDP request timeouts.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Cdp(CdpError::Timeout))
    }
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("could not reach {url} after {attempts} attempts")]
    Navigation { url: String, attempts: u32 },

    #[error("search for \"{query}\" failed after {attempts} attempts")]
    SearchFailed { query: String, attempts: u32 },

    #[error("failed to persist records: {source}")]
    Sink {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
