use crate::filter::SpiceFilterMode;
use crate::i18n::Language;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Menu sources
    pub api_base: Option<String>,
    pub restaurant_number: String,
    pub table_number: Option<String>,
    pub menu_data_path: PathBuf,

    // Browsing
    pub language: Language,
    pub spice_filter_mode: SpiceFilterMode,

    // Session persistence
    pub preferences_path: PathBuf,

    // Input pacing
    pub search_debounce: Duration,
    pub scroll_throttle: Duration,

    // HTTP
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Menu sources - an unset or blank API base means local file only
            api_base: std::env::var("MENU_API_BASE")
                .ok()
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty()),
            restaurant_number: std::env::var("RESTAURANT_NUMBER")
                .unwrap_or_else(|_| "12345".to_string()),
            table_number: std::env::var("TABLE_NUMBER")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            menu_data_path: std::env::var("MENU_DATA_PATH")
                .unwrap_or_else(|_| "menu_data.json".to_string())
                .into(),

            // Browsing
            language: match std::env::var("MENU_LANGUAGE") {
                Ok(code) => Language::from_code(code.trim()).context("Invalid MENU_LANGUAGE")?,
                Err(_) => Language::canonical(),
            },
            spice_filter_mode: match std::env::var("SPICE_FILTER_MODE") {
                Ok(mode) => mode
                    .parse()
                    .map_err(anyhow::Error::msg)
                    .context("Invalid SPICE_FILTER_MODE")?,
                Err(_) => SpiceFilterMode::default(),
            },

            // Session persistence
            preferences_path: std::env::var("PREFERENCES_PATH")
                .unwrap_or_else(|_| "preferences.json".to_string())
                .into(),

            // Input pacing
            search_debounce: Duration::from_millis(
                std::env::var("SEARCH_DEBOUNCE_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(300),
            ),
            scroll_throttle: Duration::from_millis(
                std::env::var("SCROLL_THROTTLE_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(100),
            ),

            // HTTP
            http_timeout: Duration::from_secs(
                std::env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
        })
    }
}
