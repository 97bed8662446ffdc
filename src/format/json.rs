//! JSON output formatter

use crate::error::Result;
use crate::format::{OutputFormatter, Report};

/// JSON formatter - outputs the full report as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON report"
    }

    fn format(&self, report: &Report) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures;

    #[test]
    fn test_json_search_report() {
        let output = JsonFormatter.format(&fixtures::search_report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["kind"], "search");
        assert_eq!(parsed["search"], "nearby");
        assert_eq!(parsed["pages"][0]["status"], "OK");
        assert_eq!(parsed["pages"][0]["places"][0]["name"], "Cafe <Central>");
        assert_eq!(parsed["pages"][0]["places"][0]["open_now"], "open");
    }

    #[test]
    fn test_json_detail_report_flattens_summary() {
        let output = JsonFormatter.format(&fixtures::detail_report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["kind"], "details");
        assert_eq!(parsed["detail"]["place_id"], "p1");
        assert_eq!(parsed["detail"]["phone"], "+1 555 0100");
        assert!(parsed["detail"].get("enrichment_url").is_none());
    }
}
