//! JSON projection of places API responses
//!
//! Entries are decoded one at a time, so a single malformed result is skipped
//! instead of failing the whole page.

use super::{OpenState, PoiSummary};
use crate::coord::Position;
use crate::status::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub(crate) struct RawLatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGeometry {
    pub location: RawLatLng,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawOpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

/// Fields shared by search results and detail records
#[derive(Debug, Deserialize)]
pub(crate) struct RawPlace {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<RawOpeningHours>,
    pub geometry: RawGeometry,
}

impl RawPlace {
    /// Project into a summary; a formatted address wins over the vicinity
    pub fn to_summary(&self) -> PoiSummary {
        let formatted_address = self
            .formatted_address
            .clone()
            .or_else(|| self.vicinity.clone())
            .unwrap_or_default();

        PoiSummary {
            place_id: self.place_id.clone(),
            name: self.name.clone(),
            formatted_address,
            rating: self.rating.unwrap_or(0.0),
            open_now: OpenState::from(self.opening_hours.as_ref().and_then(|h| h.open_now)),
            location: Position::new(self.geometry.location.lat, self.geometry.location.lng),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

/// A decoded search page
#[derive(Debug)]
pub(crate) struct ParsedPage {
    pub status: StatusCode,
    /// Empty when there are no further pages
    pub next_page_token: String,
    pub places: Vec<PoiSummary>,
}

/// Map the `status` field; a missing status is `Error`
pub(crate) fn status_of(status: Option<&str>) -> StatusCode {
    status.map(StatusCode::from_api).unwrap_or(StatusCode::Error)
}

/// Decode each array entry independently, dropping the ones that do not fit
pub(crate) fn decode_entries<T: DeserializeOwned>(entries: Vec<serde_json::Value>, what: &str) -> Vec<T> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(index, "skipping malformed {}: {}", what, e);
                None
            }
        })
        .collect()
}

pub(crate) fn parse_search(body: &[u8]) -> Result<ParsedPage, serde_json::Error> {
    let raw: RawSearchResponse = serde_json::from_slice(body)?;
    let places = decode_entries::<RawPlace>(raw.results, "search result")
        .iter()
        .map(RawPlace::to_summary)
        .collect();

    Ok(ParsedPage {
        status: status_of(raw.status.as_deref()),
        next_page_token: raw.next_page_token.unwrap_or_default(),
        places,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_canned_page() {
        let body = br#"{"status":"OK","results":[{"place_id":"p1","name":"Cafe","rating":4.2,"vicinity":"1 Main St","geometry":{"location":{"lat":1.0,"lng":2.0}}}],"next_page_token":"tok1"}"#;
        let page = parse_search(body).unwrap();

        assert_eq!(page.status, StatusCode::Ok);
        assert_eq!(page.next_page_token, "tok1");
        assert_eq!(page.places.len(), 1);
        let cafe = &page.places[0];
        assert_eq!(cafe.place_id, "p1");
        assert_eq!(cafe.name, "Cafe");
        assert_relative_eq!(cafe.rating, 4.2);
        assert_eq!(cafe.formatted_address, "1 Main St");
        assert_eq!(cafe.open_now, OpenState::Unknown);
        assert_eq!(cafe.location, Position::new(1.0, 2.0));
    }

    #[test]
    fn test_zero_results() {
        let page = parse_search(br#"{"status":"ZERO_RESULTS"}"#).unwrap();
        assert_eq!(page.status, StatusCode::ZeroResults);
        assert!(page.places.is_empty());
        assert!(page.next_page_token.is_empty());
    }

    #[test]
    fn test_formatted_address_wins_and_defaults_apply() {
        let body = br#"{"status":"OK","results":[
            {"name":"Museum","vicinity":"Near","formatted_address":"1 Art Way, Town",
             "opening_hours":{"open_now":false},
             "geometry":{"location":{"lat":3.0,"lng":4.0}}},
            {"geometry":{"location":{"lat":5.0,"lng":6.0}}}
        ]}"#;
        let page = parse_search(body).unwrap();

        assert_eq!(page.places[0].formatted_address, "1 Art Way, Town");
        assert_eq!(page.places[0].open_now, OpenState::Closed);
        assert_eq!(page.places[1].name, "");
        assert_eq!(page.places[1].formatted_address, "");
        assert_eq!(page.places[1].rating, 0.0);
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        let body = br#"{"status":"OK","results":[
            {"name":"No geometry"},
            {"name":"Ok","geometry":{"location":{"lat":1.0,"lng":1.0}}}
        ]}"#;
        let page = parse_search(body).unwrap();
        assert_eq!(page.places.len(), 1);
        assert_eq!(page.places[0].name, "Ok");
    }

    #[test]
    fn test_unknown_or_missing_status() {
        assert_eq!(parse_search(br#"{"status":"WHAT"}"#).unwrap().status, StatusCode::Error);
        assert_eq!(parse_search(br#"{}"#).unwrap().status, StatusCode::Error);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(parse_search(b"<html>").is_err());
    }
}
