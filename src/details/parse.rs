//! Detail response projection

use super::PoiDetail;
use crate::search::parse::{status_of, RawPlace};
use crate::status::StatusCode;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct RawPhoto {
    #[serde(default)]
    photo_reference: String,
}

#[derive(Debug, Deserialize)]
struct RawDetail {
    #[serde(flatten)]
    place: RawPlace,
    #[serde(default)]
    international_phone_number: Option<String>,
    #[serde(default)]
    formatted_phone_number: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    photos: Vec<RawPhoto>,
}

#[derive(Debug, Deserialize)]
struct RawDetailResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    result: Option<serde_json::Value>,
}

impl From<RawDetail> for PoiDetail {
    fn from(raw: RawDetail) -> Self {
        let opening_hours_text = raw
            .place
            .opening_hours
            .as_ref()
            .map(|hours| hours.weekday_text.join("\n"))
            .unwrap_or_default();

        PoiDetail {
            summary: raw.place.to_summary(),
            phone: raw
                .international_phone_number
                .or(raw.formatted_phone_number)
                .unwrap_or_default(),
            website: raw.website.unwrap_or_default(),
            external_url: raw.url.unwrap_or_default(),
            opening_hours_text,
            photo_references: raw
                .photos
                .into_iter()
                .map(|photo| photo.photo_reference)
                .filter(|reference| !reference.is_empty())
                .collect(),
            enrichment_text: None,
            enrichment_url: None,
        }
    }
}

/// Status plus the primary result, if there is a usable one
pub(crate) fn parse_detail(body: &[u8]) -> Result<(StatusCode, Option<PoiDetail>), serde_json::Error> {
    let raw: RawDetailResponse = serde_json::from_slice(body)?;
    let status = status_of(raw.status.as_deref());

    let detail = raw.result.and_then(|result| match serde_json::from_value::<RawDetail>(result) {
        Ok(detail) => Some(PoiDetail::from(detail)),
        Err(e) => {
            warn!("unusable detail result: {}", e);
            None
        }
    });

    Ok((status, detail))
}
