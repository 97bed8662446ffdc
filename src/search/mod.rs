//! Places search
//!
//! [`SearchQueryEngine`] owns a mutable parameter set for one search endpoint
//! and pages through results with the continuation token the upstream API
//! returns. [`AutocompleteEngine`] turns partial input into place predictions.

pub mod autocomplete;
pub(crate) mod parse;
pub mod query;

use crate::constants::api;
use crate::coord::Position;
use crate::status::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use autocomplete::{AutocompleteEngine, AutocompleteOutcome, Prediction};
pub use query::{RankBy, SearchQueryEngine};

/// Search endpoint flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// Places around a location, by radius or ranked by distance
    #[default]
    Nearby,
    /// Free-text query
    Text,
    /// Up to 200 bare results around a location
    Radar,
}

impl SearchKind {
    /// Endpoint path below the places root
    pub fn path(&self) -> &'static str {
        match self {
            Self::Nearby => api::NEARBY_SEARCH_PATH,
            Self::Text => api::TEXT_SEARCH_PATH,
            Self::Radar => api::RADAR_SEARCH_PATH,
        }
    }

    /// Whether the endpoint takes a location and radius
    pub fn is_located(&self) -> bool {
        matches!(self, Self::Nearby | Self::Radar)
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearby => write!(f, "nearby"),
            Self::Text => write!(f, "text"),
            Self::Radar => write!(f, "radar"),
        }
    }
}

impl FromStr for SearchKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearby" => Ok(Self::Nearby),
            "text" => Ok(Self::Text),
            "radar" => Ok(Self::Radar),
            _ => Err(format!("Unknown search kind: {}", s)),
        }
    }
}

/// Whether a place is open right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenState {
    #[default]
    Unknown,
    Open,
    Closed,
}

impl From<Option<bool>> for OpenState {
    fn from(open_now: Option<bool>) -> Self {
        match open_now {
            Some(true) => Self::Open,
            Some(false) => Self::Closed,
            None => Self::Unknown,
        }
    }
}

impl fmt::Display for OpenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// One search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiSummary {
    pub place_id: String,
    pub name: String,
    /// Formatted address, or the vicinity when the endpoint has no full address
    pub formatted_address: String,
    /// 0.0 when unrated
    pub rating: f64,
    pub open_now: OpenState,
    pub location: Position,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub status: StatusCode,
    /// Empty unless `status` is `Ok`
    pub places: Vec<PoiSummary>,
}

impl SearchPage {
    pub(crate) fn failed(status: StatusCode) -> Self {
        Self {
            status,
            places: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("nearby".parse::<SearchKind>().unwrap(), SearchKind::Nearby);
        assert_eq!("TEXT".parse::<SearchKind>().unwrap(), SearchKind::Text);
        assert_eq!("radar".parse::<SearchKind>().unwrap(), SearchKind::Radar);
        assert!("places".parse::<SearchKind>().is_err());
    }

    #[test]
    fn test_kind_paths() {
        assert_eq!(SearchKind::Nearby.path(), "/nearbysearch/json");
        assert_eq!(SearchKind::Text.path(), "/textsearch/json");
        assert!(!SearchKind::Text.is_located());
        assert!(SearchKind::Radar.is_located());
    }

    #[test]
    fn test_open_state_from_flag() {
        assert_eq!(OpenState::from(Some(true)), OpenState::Open);
        assert_eq!(OpenState::from(Some(false)), OpenState::Closed);
        assert_eq!(OpenState::from(None), OpenState::Unknown);
    }
}
