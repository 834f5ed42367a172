pub mod browser;
pub mod error;
pub mod extract;
pub mod feed;
pub mod navigate;
pub mod normalize;
pub mod pacing;
pub mod pipeline;
pub mod resolver;

pub use browser::{ChromiumPage, ChromiumSession, MapPage, ResultCard, Scope};
pub use error::{BrowserError, ScraperError};
pub use extract::{BusinessExtractor, ExtractTimeouts};
pub use feed::{scroll_until_stable, ScrollLimits, ScrollOutcome, ScrollStop};
pub use navigate::{navigate, NavigationPolicy};
pub use normalize::{accept_website, clean_phone, parse_rating_and_reviews, RatingSummary};
pub use pacing::{DelayRange, Pacing};
pub use pipeline::{ExtractionPipeline, PipelineSettings, RunSummary};
pub use resolver::{resolve, Lookup};
