//! Centralized constants for the placefinder crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in meters (WGS84 approximation)
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
}

/// External API endpoints
pub mod api {
    /// Google Places web API root (search, details, photo, autocomplete)
    pub const PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

    /// Path segments appended to the places root
    pub const NEARBY_SEARCH_PATH: &str = "/nearbysearch/json";
    pub const TEXT_SEARCH_PATH: &str = "/textsearch/json";
    pub const RADAR_SEARCH_PATH: &str = "/radarsearch/json";
    pub const DETAILS_PATH: &str = "/details/json";
    pub const AUTOCOMPLETE_PATH: &str = "/autocomplete/json";
    pub const PHOTO_PATH: &str = "/photo";

    /// MediaWiki query API used for the encyclopedia summary
    pub const WIKI_API_URL: &str = "https://en.wikipedia.org/w/api.php";

    /// Prefix for human-facing encyclopedia article links
    pub const WIKI_PAGE_BASE: &str = "https://en.wikipedia.org/wiki/";

    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";
}

/// Pipeline timing
pub mod timing {
    /// Minimum spacing between paginated queries, required upstream before a
    /// page token becomes valid
    pub const QUERY_INTERVAL_MS: u64 = 3_000;

    /// How long a location request waits for a fresh fix
    pub const LOCATION_UPDATE_TIMEOUT_MS: u64 = 150_000;
}

/// Cache settings
pub mod cache {
    /// Last-known IP fix cache file name
    pub const LAST_FIX_CACHE_FILE: &str = "last_fix.json";
}
