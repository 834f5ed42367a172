pub mod app_config;
pub mod config;
pub mod records;
pub mod selectors;

pub use app_config::{AppConfig, BrowserSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{BusinessRecord, RecordSink, SearchQuery, DEFAULT_CATEGORY, RECORD_HEADERS};
pub use selectors::{
    load_selector_config, ExtractionStrategy, Normalizer, ReadMode, SelectorConfig, StrategyChain,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read selectors file {path}: {source}")]
    SelectorsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse selectors file: {0}")]
    SelectorsFileParse(#[from] serde_yaml::Error),

    #[error("invalid selector configuration: {0}")]
    InvalidSelectors(String),
}
