//! GPX output formatter

use crate::coord::Position;
use crate::error::Result;
use crate::format::{OutputFormatter, Report};
use chrono::Utc;

/// GPX formatter - outputs GPX waypoint file
///
/// Every place (or the resolved position) becomes one waypoint. Reports
/// without coordinates produce an empty track file.
pub struct GpxFormatter;

struct Waypoint<'a> {
    position: &'a Position,
    name: &'a str,
    desc: Option<&'a str>,
}

impl OutputFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoint file"
    }

    fn format(&self, report: &Report) -> Result<String> {
        let label = match report {
            Report::Location {
                address: Some(address),
                ..
            } => address.address().map(|a| a.location_label()),
            _ => None,
        };

        let waypoints: Vec<Waypoint<'_>> = match report {
            Report::Location { position, .. } => position
                .iter()
                .map(|position| Waypoint {
                    position,
                    name: "Current position",
                    desc: label.as_deref(),
                })
                .collect(),
            Report::Search { pages, .. } => pages
                .iter()
                .flat_map(|page| &page.places)
                .map(|place| Waypoint {
                    position: &place.location,
                    name: &place.name,
                    desc: Some(place.formatted_address.as_str()).filter(|a| !a.is_empty()),
                })
                .collect(),
            Report::Details(outcome) => outcome
                .detail
                .iter()
                .map(|detail| Waypoint {
                    position: &detail.summary.location,
                    name: &detail.summary.name,
                    desc: Some(detail.summary.formatted_address.as_str()).filter(|a| !a.is_empty()),
                })
                .collect(),
            Report::Autocomplete(_) => Vec::new(),
        };

        let mut gpx = String::new();

        // XML header
        gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        gpx.push('\n');
        gpx.push_str(r#"<gpx version="1.1" creator="placefinder">"#);
        gpx.push('\n');

        // Metadata
        gpx.push_str("  <metadata>\n");
        gpx.push_str(&format!("    <time>{}</time>\n", Utc::now().to_rfc3339()));
        gpx.push_str("  </metadata>\n");

        for waypoint in &waypoints {
            gpx.push_str(&format!(
                r#"  <wpt lat="{}" lon="{}">"#,
                waypoint.position.latitude, waypoint.position.longitude
            ));
            gpx.push('\n');
            gpx.push_str(&format!("    <name>{}</name>\n", escape(waypoint.name)));
            if let Some(desc) = waypoint.desc {
                gpx.push_str(&format!("    <desc>{}</desc>\n", escape(desc)));
            }
            gpx.push_str("  </wpt>\n");
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }
}

/// Escape XML special characters
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
