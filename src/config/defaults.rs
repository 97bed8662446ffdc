//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::{api, timing};

/// Freshness window for a cached fix; zero disables the check
pub const DEFAULT_FRESHNESS_WINDOW_MS: u64 = 0;

/// Time to wait for a fresh fix
pub const DEFAULT_UPDATE_TIMEOUT_MS: u64 = timing::LOCATION_UPDATE_TIMEOUT_MS;

/// Spacing between next-page queries
pub const DEFAULT_QUERY_INTERVAL_MS: u64 = timing::QUERY_INTERVAL_MS;

/// Default search radius in meters
pub const DEFAULT_RADIUS: u32 = 1500;

/// Encyclopedia enrichment on detail requests
pub const DEFAULT_ENRICHMENT: bool = true;

/// Maximum distance between a place and its article coordinate for the
/// article link to be attached
pub const DEFAULT_ENRICHMENT_MAX_DISTANCE_M: f64 = 100.0;

/// HTTP request timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every request (Nominatim requires one)
pub const DEFAULT_USER_AGENT: &str = concat!("placefinder/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_PLACES_BASE: &str = api::PLACES_BASE_URL;
pub const DEFAULT_WIKI_API: &str = api::WIKI_API_URL;
pub const DEFAULT_WIKI_PAGE_BASE: &str = api::WIKI_PAGE_BASE;
pub const DEFAULT_NOMINATIM: &str = api::NOMINATIM_URL;
pub const DEFAULT_IP_API: &str = api::IP_API_URL;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "placefinder";
