//! Output formatters
//!
//! Provides trait-based output formatting for command results.

pub mod gpx;
pub mod json;
pub mod text;

use crate::coord::Position;
use crate::details::DetailOutcome;
use crate::error::Result;
use crate::geo::AddressOutcome;
use crate::location::LocationState;
use crate::search::{AutocompleteOutcome, SearchKind, SearchPage};
use crate::status::StatusCode;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Result of one CLI command, ready to be formatted
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Location {
        status: StatusCode,
        state: LocationState,
        position: Option<Position>,
        #[serde(skip_serializing_if = "Option::is_none")]
        address: Option<AddressOutcome>,
    },
    Search {
        search: SearchKind,
        pages: Vec<SearchPage>,
    },
    Details(DetailOutcome),
    Autocomplete(AutocompleteOutcome),
}

impl Report {
    /// Status of the command as a whole: the first non-OK status, if any
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Location { status, .. } => *status,
            Self::Search { pages, .. } => pages
                .iter()
                .map(|page| page.status)
                .find(|status| !status.is_ok())
                .unwrap_or(StatusCode::Ok),
            Self::Details(outcome) => outcome.status,
            Self::Autocomplete(outcome) => outcome.status,
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format a command report
    fn format(&self, report: &Report) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "gpx" => Some(Box::new(gpx::GpxFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    vec![
        FormatInfo {
            name: "json".to_string(),
            description: "Full JSON report".to_string(),
        },
        FormatInfo {
            name: "text".to_string(),
            description: "Human-readable text".to_string(),
        },
        FormatInfo {
            name: "gpx".to_string(),
            description: "GPX waypoint file".to_string(),
        },
    ]
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::details::PoiDetail;
    use crate::search::{OpenState, PoiSummary};

    pub fn cafe() -> PoiSummary {
        PoiSummary {
            place_id: "p1".to_string(),
            name: "Cafe <Central>".to_string(),
            formatted_address: "1 Main St".to_string(),
            rating: 4.2,
            open_now: OpenState::Open,
            location: Position::new(1.5, 2.5),
        }
    }

    pub fn search_report() -> Report {
        Report::Search {
            search: SearchKind::Nearby,
            pages: vec![SearchPage {
                status: StatusCode::Ok,
                places: vec![cafe()],
            }],
        }
    }

    pub fn detail_report() -> Report {
        Report::Details(DetailOutcome {
            status: StatusCode::Ok,
            detail: Some(PoiDetail {
                summary: cafe(),
                phone: "+1 555 0100".to_string(),
                website: "https://cafe.example".to_string(),
                external_url: String::new(),
                opening_hours_text: "Monday: 8 AM - 5 PM".to_string(),
                photo_references: vec!["r1".to_string()],
                enrichment_text: Some("A cafe.".to_string()),
                enrichment_url: None,
            }),
        })
    }
}
