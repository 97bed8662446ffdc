//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/placefinder/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Location acquisition settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Places search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Place detail settings
    #[serde(default)]
    pub details: DetailsConfig,

    /// Upstream endpoints
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// API keys for various services
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
}

/// Location acquisition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Maximum age of a cached fix in milliseconds (0 accepts any cached fix)
    #[serde(default = "default_freshness_window")]
    pub freshness_window_ms: u64,

    /// How long to wait for a fresh fix in milliseconds
    #[serde(default = "default_update_timeout")]
    pub update_timeout_ms: u64,

    /// If true, the IP location provider reports itself disabled
    #[serde(default)]
    pub offline: bool,
}

/// Places search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum spacing between next-page queries in milliseconds
    #[serde(default = "default_query_interval")]
    pub query_interval_ms: u64,

    /// Default search radius in meters
    #[serde(default = "default_radius")]
    pub radius: u32,

    /// Result language; empty leaves it to the upstream default
    #[serde(default)]
    pub language: String,
}

/// Place detail settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailsConfig {
    /// Fetch an encyclopedia summary after each detail request
    #[serde(default = "default_enrichment")]
    pub enrichment: bool,

    /// Article coordinate must be within this many meters to attach its link
    #[serde(default = "default_enrichment_max_distance")]
    pub enrichment_max_distance_m: f64,
}

/// Upstream endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_places_base")]
    pub places_base: String,

    #[serde(default = "default_wiki_api")]
    pub wiki_api: String,

    #[serde(default = "default_wiki_page_base")]
    pub wiki_page_base: String,

    #[serde(default = "default_nominatim")]
    pub nominatim: String,

    #[serde(default = "default_ip_api")]
    pub ip_api: String,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeysConfig {
    /// Places web API key
    #[serde(default)]
    pub places: String,
}

// Default value functions for serde
fn default_freshness_window() -> u64 {
    DEFAULT_FRESHNESS_WINDOW_MS
}
fn default_update_timeout() -> u64 {
    DEFAULT_UPDATE_TIMEOUT_MS
}
fn default_query_interval() -> u64 {
    DEFAULT_QUERY_INTERVAL_MS
}
fn default_radius() -> u32 {
    DEFAULT_RADIUS
}
fn default_enrichment() -> bool {
    DEFAULT_ENRICHMENT
}
fn default_enrichment_max_distance() -> f64 {
    DEFAULT_ENRICHMENT_MAX_DISTANCE_M
}
fn default_places_base() -> String {
    DEFAULT_PLACES_BASE.to_string()
}
fn default_wiki_api() -> String {
    DEFAULT_WIKI_API.to_string()
}
fn default_wiki_page_base() -> String {
    DEFAULT_WIKI_PAGE_BASE.to_string()
}
fn default_nominatim() -> String {
    DEFAULT_NOMINATIM.to_string()
}
fn default_ip_api() -> String {
    DEFAULT_IP_API.to_string()
}
fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            freshness_window_ms: default_freshness_window(),
            update_timeout_ms: default_update_timeout(),
            offline: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query_interval_ms: default_query_interval(),
            radius: default_radius(),
            language: String::new(),
        }
    }
}

impl Default for DetailsConfig {
    fn default() -> Self {
        Self {
            enrichment: default_enrichment(),
            enrichment_max_distance_m: default_enrichment_max_distance(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            places_base: default_places_base(),
            wiki_api: default_wiki_api(),
            wiki_page_base: default_wiki_page_base(),
            nominatim: default_nominatim(),
            ip_api: default_ip_api(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl LocationConfig {
    /// Freshness window, `None` when the check is disabled
    pub fn freshness_window(&self) -> Option<Duration> {
        match self.freshness_window_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn update_timeout(&self) -> Duration {
        Duration::from_millis(self.update_timeout_ms)
    }
}

impl SearchConfig {
    pub fn query_interval(&self) -> Duration {
        Duration::from_millis(self.query_interval_ms)
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path()?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["location", "freshness_window_ms"] => {
                Some(self.location.freshness_window_ms.to_string())
            }
            ["location", "update_timeout_ms"] => Some(self.location.update_timeout_ms.to_string()),
            ["location", "offline"] => Some(self.location.offline.to_string()),

            ["search", "query_interval_ms"] => Some(self.search.query_interval_ms.to_string()),
            ["search", "radius"] => Some(self.search.radius.to_string()),
            ["search", "language"] => Some(self.search.language.clone()),

            ["details", "enrichment"] => Some(self.details.enrichment.to_string()),
            ["details", "enrichment_max_distance_m"] => {
                Some(self.details.enrichment_max_distance_m.to_string())
            }

            ["endpoints", "places_base"] => Some(self.endpoints.places_base.clone()),
            ["endpoints", "wiki_api"] => Some(self.endpoints.wiki_api.clone()),
            ["endpoints", "wiki_page_base"] => Some(self.endpoints.wiki_page_base.clone()),
            ["endpoints", "nominatim"] => Some(self.endpoints.nominatim.clone()),
            ["endpoints", "ip_api"] => Some(self.endpoints.ip_api.clone()),

            ["http", "timeout_secs"] => Some(self.http.timeout_secs.to_string()),
            ["http", "user_agent"] => Some(self.http.user_agent.clone()),

            ["api_keys", "places"] => Some(self.api_keys.places.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["location", "freshness_window_ms"] => {
                self.location.freshness_window_ms = parse_value(key, value)?;
            }
            ["location", "update_timeout_ms"] => {
                self.location.update_timeout_ms = parse_value(key, value)?;
            }
            ["location", "offline"] => {
                self.location.offline = parse_value(key, value)?;
            }

            ["search", "query_interval_ms"] => {
                self.search.query_interval_ms = parse_value(key, value)?;
            }
            ["search", "radius"] => {
                self.search.radius = parse_value(key, value)?;
            }
            ["search", "language"] => {
                self.search.language = value.to_string();
            }

            ["details", "enrichment"] => {
                self.details.enrichment = parse_value(key, value)?;
            }
            ["details", "enrichment_max_distance_m"] => {
                self.details.enrichment_max_distance_m = parse_value(key, value)?;
            }

            ["endpoints", "places_base"] => {
                self.endpoints.places_base = value.trim_end_matches('/').to_string();
            }
            ["endpoints", "wiki_api"] => {
                self.endpoints.wiki_api = value.to_string();
            }
            ["endpoints", "wiki_page_base"] => {
                self.endpoints.wiki_page_base = value.to_string();
            }
            ["endpoints", "nominatim"] => {
                self.endpoints.nominatim = value.trim_end_matches('/').to_string();
            }
            ["endpoints", "ip_api"] => {
                self.endpoints.ip_api = value.to_string();
            }

            ["http", "timeout_secs"] => {
                self.http.timeout_secs = parse_value(key, value)?;
            }
            ["http", "user_agent"] => {
                self.http.user_agent = value.to_string();
            }

            ["api_keys", "places"] => {
                self.api_keys.places = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "location.freshness_window_ms",
            "location.update_timeout_ms",
            "location.offline",
            "search.query_interval_ms",
            "search.radius",
            "search.language",
            "details.enrichment",
            "details.enrichment_max_distance_m",
            "endpoints.places_base",
            "endpoints.wiki_api",
            "endpoints.wiki_page_base",
            "endpoints.nominatim",
            "endpoints.ip_api",
            "http.timeout_secs",
            "http.user_agent",
            "api_keys.places",
        ]
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}
