//! Nominatim reverse geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API. Nominatim requires a descriptive User-Agent
//! and allows roughly one request per second.

use crate::config::Config;
use crate::geo::{AddressRecord, GeocodeError, GeocodingProvider};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Nominatim geocoding backend
///
/// Blocking; the dispatcher calls it from a worker thread.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

/// Nominatim reverse response
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    house_number: Option<String>,
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, timeout: Duration, user_agent: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            user_agent: user_agent.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.endpoints.nominatim.clone(),
            config.http.timeout(),
            config.http.user_agent.clone(),
        )
    }

    fn reverse_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1",
            self.base_url, latitude, longitude
        )
    }
}

fn check_coordinates(latitude: f64, longitude: f64) -> Result<(), GeocodeError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(GeocodeError::IllegalArgument(format!(
            "Latitude {} is out of range [-90, 90]",
            latitude
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(GeocodeError::IllegalArgument(format!(
            "Longitude {} is out of range [-180, 180]",
            longitude
        )));
    }
    Ok(())
}

/// Convert a reverse response into at most one address record
fn to_records(response: ReverseResponse) -> Vec<AddressRecord> {
    if let Some(error) = response.error {
        debug!("nominatim has no address here: {}", error);
        return Vec::new();
    }

    let address = response.address.unwrap_or_default();
    let street = match (address.house_number, address.road) {
        (Some(number), Some(road)) => Some(format!("{} {}", number, road)),
        (None, Some(road)) => Some(road),
        _ => None,
    };

    let lines: Vec<String> = street.into_iter().chain(response.display_name).collect();
    if lines.is_empty() {
        return Vec::new();
    }

    vec![AddressRecord {
        lines,
        locality: address.city.or(address.town).or(address.village),
        admin_area: address.state,
        postal_code: address.postcode,
        country: address.country,
    }]
}

impl GeocodingProvider for NominatimGeocoder {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
        max_results: usize,
    ) -> Result<Vec<AddressRecord>, GeocodeError> {
        check_coordinates(latitude, longitude)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| GeocodeError::Io(format!("Failed to build HTTP client: {}", e)))?;

        let response = client
            .get(self.reverse_url(latitude, longitude))
            .send()
            .map_err(|e| GeocodeError::Io(format!("Nominatim request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(GeocodeError::Io(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let parsed: ReverseResponse = response
            .json()
            .map_err(|e| GeocodeError::Io(format!("Failed to parse Nominatim response: {}", e)))?;

        let mut records = to_records(parsed);
        records.truncate(max_results);
        Ok(records)
    }
}
