use std::path::PathBuf;

/// Browser context settings applied when the Chromium session is created.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserSettings {
    pub headless: bool,
    /// Explicit Chromium/Chrome binary. `None` lets the launcher auto-detect.
    pub chrome_path: Option<PathBuf>,
    pub window_width: u32,
    pub window_height: u32,
    pub locale: String,
    pub timezone: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            window_width: 1280,
            window_height: 900,
            locale: "en-US".to_string(),
            timezone: "Europe/Istanbul".to_string(),
            latitude: 41.0082,
            longitude: 28.9784,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub output_path: PathBuf,
    pub search_url: String,
    pub selectors_path: Option<PathBuf>,
    pub browser: BrowserSettings,
    pub nav_timeout_ms: u64,
    pub nav_max_retries: u32,
    pub search_attempts: u32,
    pub max_results: usize,
    pub stale_scroll_limit: u32,
    pub scroll_timeout_secs: u64,
}
