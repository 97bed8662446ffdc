//! Reverse geocoding
//!
//! Turns a [`Position`](crate::coord::Position) into address records. The
//! [`GeocodingProvider`] trait is the seam; [`nominatim::NominatimGeocoder`] is
//! the production backend and [`resolver::AddressResolver`] caches the last
//! resolution.

pub mod nominatim;
pub mod resolver;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use resolver::{AddressOutcome, AddressResolver};

/// One address produced by a geocoding provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Address lines, most specific first (street line at index 0)
    pub lines: Vec<String>,
    /// City / town / village
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    /// State / province / region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl AddressRecord {
    /// First address line, empty if there is none
    pub fn street_line(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or("")
    }

    /// "locality, admin area" (whichever parts are present)
    pub fn city_line(&self) -> String {
        join_present(&[self.locality.as_deref(), self.admin_area.as_deref()])
    }

    /// "street, locality, admin area" (whichever parts are present)
    pub fn location_label(&self) -> String {
        let street = Some(self.street_line()).filter(|s| !s.is_empty());
        join_present(&[street, self.locality.as_deref(), self.admin_area.as_deref()])
    }
}

fn join_present(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why a reverse geocode failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// Coordinates out of range
    #[error("Illegal coordinates: {0}")]
    IllegalArgument(String),

    /// Transport or provider I/O failure
    #[error("Geocoder I/O failure: {0}")]
    Io(String),
}

/// Blocking reverse geocoding backend
///
/// Called by the dispatcher from a worker thread.
pub trait GeocodingProvider: Send + Sync {
    /// Returns the provider name for logging
    fn name(&self) -> &'static str;

    /// Whether the backend is usable at all
    fn is_present(&self) -> bool {
        true
    }

    /// Up to `max_results` addresses for the coordinates, best match first
    fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
        max_results: usize,
    ) -> Result<Vec<AddressRecord>, GeocodeError>;
}
