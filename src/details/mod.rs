//! Place details
//!
//! [`DetailEngine::request_details`] fetches one place's full record and, when
//! enrichment is on, chains an encyclopedia summary lookup. Enrichment never
//! fails the request: its fields simply stay empty.

pub mod enrichment;
mod parse;

use crate::config::defaults::DEFAULT_ENRICHMENT_MAX_DISTANCE_M;
use crate::config::Config;
use crate::constants::api::{DETAILS_PATH, PHOTO_PATH, PLACES_BASE_URL, WIKI_API_URL, WIKI_PAGE_BASE};
use crate::dispatch::{Dispatcher, Task};
use crate::search::PoiSummary;
use crate::status::StatusCode;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Full record of one place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiDetail {
    #[serde(flatten)]
    pub summary: PoiSummary,
    /// International number when known, else the local format
    pub phone: String,
    pub website: String,
    /// Link to the place on the provider's own site
    pub external_url: String,
    /// One line per weekday
    pub opening_hours_text: String,
    /// Opaque photo references, in upstream order
    pub photo_references: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment_url: Option<String>,
}

/// Terminal result of one detail request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailOutcome {
    pub status: StatusCode,
    pub detail: Option<PoiDetail>,
}

impl DetailOutcome {
    fn failed(status: StatusCode) -> Self {
        Self {
            status,
            detail: None,
        }
    }
}

/// Terminal result of one photo download
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoOutcome {
    pub status: StatusCode,
    /// Image bytes; empty unless `status` is `Ok`
    pub bytes: Vec<u8>,
}

/// Place detail and photo requests
#[derive(Debug, Clone)]
pub struct DetailEngine {
    dispatcher: Dispatcher,
    api_key: String,
    places_base: String,
    enrichment: bool,
    max_distance_m: f64,
    wiki_api: String,
    wiki_page_base: String,
}

impl DetailEngine {
    /// Engine with enrichment on
    pub fn new(dispatcher: Dispatcher, api_key: &str) -> Self {
        Self {
            dispatcher,
            api_key: api_key.to_string(),
            places_base: PLACES_BASE_URL.to_string(),
            enrichment: true,
            max_distance_m: DEFAULT_ENRICHMENT_MAX_DISTANCE_M,
            wiki_api: WIKI_API_URL.to_string(),
            wiki_page_base: WIKI_PAGE_BASE.to_string(),
        }
    }

    pub fn from_config(dispatcher: Dispatcher, config: &Config) -> Self {
        Self::new(dispatcher, &config.api_keys.places)
            .with_base_url(&config.endpoints.places_base)
            .with_enrichment(config.details.enrichment)
            .with_enrichment_max_distance(config.details.enrichment_max_distance_m)
            .with_wiki_endpoints(&config.endpoints.wiki_api, &config.endpoints.wiki_page_base)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.places_base = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_enrichment(mut self, enabled: bool) -> Self {
        self.enrichment = enabled;
        self
    }

    pub fn with_enrichment_max_distance(mut self, meters: f64) -> Self {
        self.max_distance_m = meters;
        self
    }

    pub fn with_wiki_endpoints(mut self, api_url: &str, page_base: &str) -> Self {
        self.wiki_api = api_url.to_string();
        self.wiki_page_base = page_base.to_string();
        self
    }

    pub fn details_url(&self, place_id: &str) -> String {
        format!(
            "{}{}?placeid={}&key={}",
            self.places_base,
            DETAILS_PATH,
            urlencoding::encode(place_id),
            urlencoding::encode(&self.api_key)
        )
    }

    /// Photo URL; at least one bound is required upstream
    pub fn photo_url(&self, reference: &str, max_width: Option<u32>, max_height: Option<u32>) -> String {
        let mut url = format!("{}{}?", self.places_base, PHOTO_PATH);
        if let Some(width) = max_width {
            url.push_str(&format!("maxwidth={}&", width));
        }
        if let Some(height) = max_height {
            url.push_str(&format!("maxheight={}&", height));
        }
        url.push_str(&format!(
            "key={}&photoreference={}",
            urlencoding::encode(&self.api_key),
            urlencoding::encode(reference)
        ));
        url
    }

    /// Fetch the full record for `place_id`
    ///
    /// Completes once, after the enrichment lookup if one runs.
    pub async fn request_details(&self, place_id: &str) -> DetailOutcome {
        info!(place_id, "requesting place details");
        let completion = self
            .dispatcher
            .dispatch(Task::FetchUrl(self.details_url(place_id)))
            .await;
        if !completion.status.is_ok() {
            warn!(status = %completion.status, "detail request failed");
            return DetailOutcome::failed(completion.status);
        }

        let body = completion.into_bytes().unwrap_or_default();
        let (status, detail) = match parse::parse_detail(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("failed to parse detail response: {}", e);
                return DetailOutcome::failed(StatusCode::Error);
            }
        };

        if !status.is_ok() {
            warn!(status = %status, "detail request rejected upstream");
            return DetailOutcome::failed(status);
        }
        let Some(mut detail) = detail else {
            warn!(place_id, "detail response has no result");
            return DetailOutcome::failed(StatusCode::NotFound);
        };

        if self.enrichment {
            self.enrich(&mut detail).await;
        }

        DetailOutcome {
            status: StatusCode::Ok,
            detail: Some(detail),
        }
    }

    /// Attach the encyclopedia summary, if one can be found
    async fn enrich(&self, detail: &mut PoiDetail) {
        let title = enrichment::article_title(&detail.summary.name);
        if title.is_empty() {
            debug!("no usable article title");
            return;
        }

        let completion = self
            .dispatcher
            .dispatch(Task::FetchUrl(enrichment::summary_url(&self.wiki_api, &title)))
            .await;
        if !completion.status.is_ok() {
            debug!(status = %completion.status, "enrichment lookup failed");
            return;
        }

        let body = completion.into_bytes().unwrap_or_default();
        let summary = match enrichment::parse_summary(&body) {
            Ok(Some(summary)) => summary,
            Ok(None) => {
                debug!(title = %title, "no article found");
                return;
            }
            Err(e) => {
                debug!("failed to parse enrichment response: {}", e);
                return;
            }
        };

        detail.enrichment_text = Some(summary.extract);

        if let Some((lat, lon)) = summary.coordinate {
            let place = detail.summary.location;
            let distance = crate::coord::haversine_distance(lat, lon, place.latitude, place.longitude);
            if distance < self.max_distance_m {
                detail.enrichment_url = Some(enrichment::article_url(&self.wiki_page_base, &title));
            } else {
                debug!(distance_m = distance, "article coordinate too far from place");
            }
        }
    }

    /// Download one photo
    pub async fn download_photo(
        &self,
        reference: &str,
        max_width: Option<u32>,
        max_height: Option<u32>,
    ) -> PhotoOutcome {
        if reference.is_empty() || (max_width.is_none() && max_height.is_none()) {
            warn!("photo request needs a reference and a size bound");
            return PhotoOutcome {
                status: StatusCode::InvalidRequest,
                bytes: Vec::new(),
            };
        }

        let completion = self
            .dispatcher
            .dispatch(Task::FetchUrl(self.photo_url(reference, max_width, max_height)))
            .await;
        let status = completion.status;
        PhotoOutcome {
            status,
            bytes: completion.into_bytes().unwrap_or_default(),
        }
    }
}
