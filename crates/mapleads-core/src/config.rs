use crate::app_config::{AppConfig, BrowserSettings};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields the stock
/// configuration used for the dentist search.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let at_least_one = |var: &str, value: u32| -> Result<u32, ConfigError> {
        if value == 0 {
            Err(invalid(var, "must be at least 1".to_string()))
        } else {
            Ok(value)
        }
    };

    let optional_path = |var: &str| -> Option<PathBuf> {
        lookup(var)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    };

    let log_level = or_default("MAPLEADS_LOG_LEVEL", "info");
    let output_path = PathBuf::from(or_default("MAPLEADS_OUTPUT_PATH", "leads.csv"));
    let search_url = or_default("MAPLEADS_SEARCH_URL", "https://www.google.com/maps");
    let selectors_path = optional_path("MAPLEADS_SELECTORS_PATH");

    let headless = parse_bool(&or_default("MAPLEADS_HEADLESS", "true"))
        .ok_or_else(|| invalid("MAPLEADS_HEADLESS", "expected true or false".to_string()))?;
    let browser = BrowserSettings {
        headless,
        chrome_path: optional_path("MAPLEADS_CHROME_PATH"),
        ..BrowserSettings::default()
    };

    let nav_timeout_ms = parse_u64("MAPLEADS_NAV_TIMEOUT_MS", "30000")?;
    let nav_max_retries = at_least_one(
        "MAPLEADS_NAV_MAX_RETRIES",
        parse_u32("MAPLEADS_NAV_MAX_RETRIES", "2")?,
    )?;
    let search_attempts = at_least_one(
        "MAPLEADS_SEARCH_ATTEMPTS",
        parse_u32("MAPLEADS_SEARCH_ATTEMPTS", "2")?,
    )?;
    let max_results = parse_usize("MAPLEADS_MAX_RESULTS", "200")?;
    let stale_scroll_limit = at_least_one(
        "MAPLEADS_STALE_SCROLL_LIMIT",
        parse_u32("MAPLEADS_STALE_SCROLL_LIMIT", "3")?,
    )?;
    let scroll_timeout_secs = parse_u64("MAPLEADS_SCROLL_TIMEOUT_SECS", "90")?;

    Ok(AppConfig {
        log_level,
        output_path,
        search_url,
        selectors_path,
        browser,
        nav_timeout_ms,
        nav_max_retries,
        search_attempts,
        max_results,
        stale_scroll_limit,
        scroll_timeout_secs,
    })
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
