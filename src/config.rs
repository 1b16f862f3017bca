use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::reveal::RevealTiming;

/// Top-level configuration for the recipe screens
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Remote catalog service settings
    #[serde(default)]
    pub service: ServiceConfig,
    /// Reveal choreography timings
    #[serde(default)]
    pub reveal: RevealConfig,
}

/// Configuration for the remote recipe catalog
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Base URL the endpoint paths are appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// First-letter filter used by the catalog grid
    #[serde(default = "default_catalog_letter")]
    pub catalog_letter: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            catalog_letter: default_catalog_letter(),
        }
    }
}

impl ServiceConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Timing table for one kind of reveal, in milliseconds
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RevealTimingConfig {
    #[serde(default)]
    pub stagger_unit_ms: u64,
    pub image_delay_ms: u64,
    pub text_delay_ms: u64,
    pub container_duration_ms: u64,
    pub image_duration_ms: u64,
    pub text_duration_ms: u64,
}

impl From<&RevealTimingConfig> for RevealTiming {
    fn from(config: &RevealTimingConfig) -> Self {
        RevealTiming {
            stagger_unit: Duration::from_millis(config.stagger_unit_ms),
            image_delay: Duration::from_millis(config.image_delay_ms),
            text_delay: Duration::from_millis(config.text_delay_ms),
            container_duration: Duration::from_millis(config.container_duration_ms),
            image_duration: Duration::from_millis(config.image_duration_ms),
            text_duration: Duration::from_millis(config.text_duration_ms),
        }
    }
}

/// Reveal timings for the catalog grid, its header and the detail page
#[derive(Debug, Deserialize, Clone)]
pub struct RevealConfig {
    #[serde(default = "default_catalog_reveal")]
    pub catalog: RevealTimingConfig,
    #[serde(default = "default_header_reveal")]
    pub header: RevealTimingConfig,
    #[serde(default = "default_detail_reveal")]
    pub detail: RevealTimingConfig,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog_reveal(),
            header: default_header_reveal(),
            detail: default_detail_reveal(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://www.themealdb.com/api/json/v1/1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("recipe-surprise/{}", env!("CARGO_PKG_VERSION"))
}

fn default_catalog_letter() -> String {
    "a".to_string()
}

fn default_catalog_reveal() -> RevealTimingConfig {
    RevealTimingConfig {
        stagger_unit_ms: 150,
        image_delay_ms: 200,
        text_delay_ms: 400,
        container_duration_ms: 600,
        image_duration_ms: 400,
        text_duration_ms: 400,
    }
}

fn default_header_reveal() -> RevealTimingConfig {
    RevealTimingConfig {
        stagger_unit_ms: 0,
        image_delay_ms: 0,
        text_delay_ms: 0,
        container_duration_ms: 800,
        image_duration_ms: 800,
        text_duration_ms: 800,
    }
}

fn default_detail_reveal() -> RevealTimingConfig {
    RevealTimingConfig {
        stagger_unit_ms: 0,
        image_delay_ms: 300,
        text_delay_ms: 600,
        container_duration_ms: 800,
        image_duration_ms: 600,
        text_duration_ms: 600,
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPES__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPES__SERVICE__BASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: RECIPES__REVEAL__CATALOG__STAGGER_UNIT_MS
        .add_source(
            Environment::with_prefix("RECIPES")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
