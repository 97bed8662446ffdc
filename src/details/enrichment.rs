//! Encyclopedia summary lookup
//!
//! The article title is derived from the place name. The article link is only
//! trusted when the article's own coordinate lies close to the place.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Characters kept verbatim in an article title besides letters and digits
const TITLE_PUNCTUATION: &[char] = &['\'', '.', '-', '(', ')', ','];

/// Article title for a place name
///
/// Runs of any other characters (whitespace included) collapse into one `_`.
pub fn article_title(name: &str) -> String {
    let mut title = String::with_capacity(name.len());
    let mut pending_gap = false;

    for c in name.chars() {
        if c.is_alphanumeric() || TITLE_PUNCTUATION.contains(&c) {
            if pending_gap && !title.is_empty() {
                title.push('_');
            }
            pending_gap = false;
            title.push(c);
        } else {
            pending_gap = true;
        }
    }
    title
}

/// Summary request URL for `title`
pub fn summary_url(api_url: &str, title: &str) -> String {
    format!(
        "{}?action=query&prop=coordinates%7Cextracts&exsectionformat=plain&explaintext&exintro&exsentences=3&format=json&titles={}",
        api_url,
        urlencoding::encode(title)
    )
}

/// Human-facing article link
pub fn article_url(page_base: &str, title: &str) -> String {
    format!("{}{}", page_base, title)
}

#[derive(Debug, Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    coordinates: Vec<RawCoordinate>,
}

#[derive(Debug, Deserialize)]
struct RawQuery {
    #[serde(default)]
    pages: BTreeMap<String, RawPage>,
}

#[derive(Debug, Deserialize)]
struct RawSummaryResponse {
    query: Option<RawQuery>,
}

/// Extract of the first page in a summary response
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub extract: String,
    /// Article coordinate (lat, lon)
    pub coordinate: Option<(f64, f64)>,
}

/// Parse a summary response; `None` when no page has a non-empty extract
pub fn parse_summary(body: &[u8]) -> Result<Option<Summary>, serde_json::Error> {
    let raw: RawSummaryResponse = serde_json::from_slice(body)?;
    let page = raw
        .query
        .and_then(|query| query.pages.into_values().next());

    Ok(page.and_then(|page| {
        let extract = page.extract.filter(|e| !e.trim().is_empty())?;
        Some(Summary {
            extract,
            coordinate: page.coordinates.first().map(|c| (c.lat, c.lon)),
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_title() {
        assert_eq!(article_title("Eiffel Tower"), "Eiffel_Tower");
        assert_eq!(article_title("  St. Paul's  Cathedral "), "St._Paul's_Cathedral");
        assert_eq!(article_title("Café & Bar / Grill"), "Café_Bar_Grill");
        assert_eq!(article_title("Big Ben (clock)"), "Big_Ben_(clock)");
        assert_eq!(article_title("!!!"), "");
    }

    #[test]
    fn test_summary_url() {
        let url = summary_url("https://wiki.test/w/api.php", "Café_Bar");
        assert!(url.starts_with("https://wiki.test/w/api.php?action=query&prop=coordinates%7Cextracts"));
        assert!(url.ends_with("&titles=Caf%C3%A9_Bar"));
    }

    #[test]
    fn test_parse_summary_with_coordinate() {
        let body = br#"{"batchcomplete":"","query":{"pages":{"9232":{"pageid":9232,"title":"Eiffel Tower",
            "coordinates":[{"lat":48.8583,"lon":2.2944,"primary":"","globe":"earth"}],
            "extract":"The Eiffel Tower is a wrought-iron lattice tower."}}}}"#;

        let summary = parse_summary(body).unwrap().unwrap();
        assert_eq!(summary.extract, "The Eiffel Tower is a wrought-iron lattice tower.");
        assert_eq!(summary.coordinate, Some((48.8583, 2.2944)));
    }

    #[test]
    fn test_missing_page_has_no_summary() {
        let body = br#"{"query":{"pages":{"-1":{"ns":0,"title":"Nowhere","missing":""}}}}"#;
        assert_eq!(parse_summary(body).unwrap(), None);
        assert_eq!(parse_summary(br#"{}"#).unwrap(), None);
    }
}
