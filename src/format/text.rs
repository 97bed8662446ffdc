//! Human-readable text output formatter

use crate::error::Result;
use crate::format::{OutputFormatter, Report};
use crate::search::PoiSummary;
use crate::status::StatusCode;

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, report: &Report) -> Result<String> {
        let mut output = String::new();

        match report {
            Report::Location {
                status,
                state,
                position,
                address,
            } => {
                match position {
                    Some(position) => output.push_str(&format!("Position: {}\n", position)),
                    None => output.push_str(&format!("No position ({})\n", status_line(*status))),
                }
                output.push_str(&format!("State: {}\n", state));

                if let Some(address) = address {
                    match address.address() {
                        Some(record) => {
                            output.push_str(&format!("Address: {}\n", record.location_label()));
                            if let Some(postal) = &record.postal_code {
                                output.push_str(&format!("Postal code: {}\n", postal));
                            }
                            if let Some(country) = &record.country {
                                output.push_str(&format!("Country: {}\n", country));
                            }
                        }
                        None => output.push_str(&format!(
                            "No address ({})\n",
                            status_line(address.status)
                        )),
                    }
                }
            }

            Report::Search { search, pages } => {
                output.push_str(&format!("{} search\n", search));
                for (index, page) in pages.iter().enumerate() {
                    output.push_str(&format!("\nPage {} ({}):\n", index + 1, status_line(page.status)));
                    for place in &page.places {
                        output.push_str(&summary_line(place));
                    }
                }
            }

            Report::Details(outcome) => match &outcome.detail {
                None => output.push_str(&format!("No details ({})\n", status_line(outcome.status))),
                Some(detail) => {
                    output.push_str(&summary_line(&detail.summary));
                    push_field(&mut output, "Phone", &detail.phone);
                    push_field(&mut output, "Website", &detail.website);
                    push_field(&mut output, "Link", &detail.external_url);
                    if !detail.opening_hours_text.is_empty() {
                        output.push_str("  Hours:\n");
                        for line in detail.opening_hours_text.lines() {
                            output.push_str(&format!("    {}\n", line));
                        }
                    }
                    if !detail.photo_references.is_empty() {
                        output.push_str(&format!("  Photos: {}\n", detail.photo_references.len()));
                    }
                    if let Some(text) = &detail.enrichment_text {
                        output.push_str(&format!("\n{}\n", text));
                    }
                    if let Some(url) = &detail.enrichment_url {
                        output.push_str(&format!("{}\n", url));
                    }
                }
            },

            Report::Autocomplete(outcome) => {
                if outcome.predictions.is_empty() {
                    output.push_str(&format!("No predictions ({})\n", status_line(outcome.status)));
                }
                for prediction in &outcome.predictions {
                    output.push_str(&format!("{}  [{}]\n", prediction.description, prediction.place_id));
                }
            }
        }

        Ok(output)
    }
}

fn status_line(status: StatusCode) -> String {
    format!("{}: {}", status, status.description())
}

fn summary_line(place: &PoiSummary) -> String {
    let rating = if place.rating > 0.0 {
        format!(" ★{:.1}", place.rating)
    } else {
        String::new()
    };
    format!(
        "  {}{} - {} ({:.6}, {:.6}) [{}] {}\n",
        place.name,
        rating,
        place.formatted_address,
        place.location.latitude,
        place.location.longitude,
        place.open_now,
        place.place_id
    )
}

fn push_field(output: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        output.push_str(&format!("  {}: {}\n", label, value));
    }
}
