//! Place autocomplete

use super::parse::{decode_entries, status_of};
use crate::config::Config;
use crate::constants::api::{AUTOCOMPLETE_PATH, PLACES_BASE_URL};
use crate::coord::Position;
use crate::dispatch::{Dispatcher, Task};
use crate::status::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One suggestion for partial input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub place_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutocompleteOutcome {
    pub status: StatusCode,
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct RawAutocompleteResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    predictions: Vec<serde_json::Value>,
}

/// Autocomplete over the places API
///
/// Keeps the predictions of the last call so a chosen description can be
/// mapped back to its place id.
#[derive(Debug)]
pub struct AutocompleteEngine {
    dispatcher: Dispatcher,
    endpoint: String,
    api_key: String,
    types: Option<String>,
    location: Option<Position>,
    radius: Option<u32>,
    predictions: Vec<Prediction>,
}

impl AutocompleteEngine {
    pub fn new(dispatcher: Dispatcher, api_key: &str) -> Self {
        Self {
            dispatcher,
            endpoint: format!("{}{}", PLACES_BASE_URL, AUTOCOMPLETE_PATH),
            api_key: api_key.to_string(),
            types: None,
            location: None,
            radius: None,
            predictions: Vec::new(),
        }
    }

    pub fn from_config(dispatcher: Dispatcher, config: &Config) -> Self {
        Self::new(dispatcher, &config.api_keys.places).with_base_url(&config.endpoints.places_base)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.endpoint = format!("{}{}", base_url.trim_end_matches('/'), AUTOCOMPLETE_PATH);
        self
    }

    /// Restrict predictions to a place type collection such as `geocode`
    pub fn set_types(&mut self, types: &str) {
        self.types = Some(types.to_string()).filter(|t| !t.is_empty());
    }

    /// Bias predictions towards `position`
    pub fn set_location(&mut self, position: Position) {
        self.location = Some(position);
    }

    /// Bias predictions towards `position` within `radius` meters
    pub fn set_location_radius(&mut self, position: Position, radius: u32) {
        self.location = Some(position);
        self.radius = Some(radius).filter(|r| *r != 0);
    }

    pub fn url(&self, input: &str) -> String {
        let mut url = format!(
            "{}?input={}&key={}",
            self.endpoint,
            urlencoding::encode(input),
            urlencoding::encode(&self.api_key)
        );
        if let Some(types) = &self.types {
            url.push_str(&format!("&types={}", urlencoding::encode(types)));
        }
        if let Some(location) = &self.location {
            url.push_str(&format!("&location={}", location.to_query_value()));
        }
        if let Some(radius) = self.radius {
            url.push_str(&format!("&radius={}", radius));
        }
        url
    }

    /// Predictions for `input`
    pub async fn predict(&mut self, input: &str) -> AutocompleteOutcome {
        self.predictions.clear();
        let completion = self.dispatcher.dispatch(Task::FetchUrl(self.url(input))).await;
        if !completion.status.is_ok() {
            return failed(completion.status);
        }

        let body = completion.into_bytes().unwrap_or_default();
        let raw: RawAutocompleteResponse = match serde_json::from_slice(&body) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("failed to parse autocomplete response: {}", e);
                return failed(StatusCode::Error);
            }
        };

        let status = status_of(raw.status.as_deref());
        if !status.is_ok() {
            warn!(status = %status, "autocomplete returned no predictions");
            return failed(status);
        }

        self.predictions = decode_entries(raw.predictions, "prediction");
        debug!(count = self.predictions.len(), "autocomplete predictions");
        AutocompleteOutcome {
            status,
            predictions: self.predictions.clone(),
        }
    }

    /// Predictions from the last call
    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    /// Place id of the prediction whose description is exactly `description`
    pub fn place_id_for(&self, description: &str) -> Option<&str> {
        self.predictions
            .iter()
            .find(|p| p.description == description)
            .map(|p| p.place_id.as_str())
    }
}

fn failed(status: StatusCode) -> AutocompleteOutcome {
    AutocompleteOutcome {
        status,
        predictions: Vec::new(),
    }
}
