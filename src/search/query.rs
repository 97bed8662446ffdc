//! Paginated search queries
//!
//! The engine is a mutable builder: set parameters, call
//! [`get_places`](SearchQueryEngine::get_places), then keep calling
//! [`get_next_places`](SearchQueryEngine::get_next_places) while
//! [`has_next_page`](SearchQueryEngine::has_next_page) holds. Upstream rejects
//! a page token used too soon after the page that produced it, so next-page
//! queries are spaced by the query interval.

use super::parse::parse_search;
use super::{SearchKind, SearchPage};
use crate::config::Config;
use crate::constants::api::PLACES_BASE_URL;
use crate::constants::timing::QUERY_INTERVAL_MS;
use crate::coord::Position;
use crate::dispatch::{Dispatcher, Task};
use crate::status::StatusCode;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

const KEY: &str = "key";
const RADIUS: &str = "radius";
const RANK_BY: &str = "rankby";

/// Result ordering for nearby search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Prominence,
    /// Requires one of keyword, name or types
    Distance,
}

impl fmt::Display for RankBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prominence => write!(f, "prominence"),
            Self::Distance => write!(f, "distance"),
        }
    }
}

/// Search query state for one endpoint
///
/// Not meant to be shared: every method that talks to the network takes
/// `&mut self`, so pages are requested strictly one after another.
#[derive(Debug)]
pub struct SearchQueryEngine {
    dispatcher: Dispatcher,
    kind: SearchKind,
    endpoint: String,
    params: BTreeMap<String, String>,
    next_page_token: String,
    last_query: Option<Instant>,
    status: StatusCode,
    query_interval: Duration,
}

impl SearchQueryEngine {
    pub fn new(dispatcher: Dispatcher, kind: SearchKind, api_key: &str) -> Self {
        let mut params = BTreeMap::new();
        params.insert(KEY.to_string(), api_key.to_string());

        Self {
            dispatcher,
            kind,
            endpoint: format!("{}{}", PLACES_BASE_URL, kind.path()),
            params,
            next_page_token: String::new(),
            last_query: None,
            status: StatusCode::Ok,
            query_interval: Duration::from_millis(QUERY_INTERVAL_MS),
        }
    }

    /// Engine with key, endpoint root, spacing and defaults from the config
    pub fn from_config(dispatcher: Dispatcher, kind: SearchKind, config: &Config) -> Self {
        let mut engine = Self::new(dispatcher, kind, &config.api_keys.places)
            .with_base_url(&config.endpoints.places_base)
            .with_query_interval(config.search.query_interval());
        if kind.is_located() {
            engine.set_radius(config.search.radius);
        }
        if !config.search.language.is_empty() {
            engine.set_language(&config.search.language);
        }
        engine
    }

    /// Point the engine at another places root
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.endpoint = format!("{}{}", base_url.trim_end_matches('/'), self.kind.path());
        self
    }

    pub fn with_query_interval(mut self, interval: Duration) -> Self {
        self.query_interval = interval;
        self
    }

    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    /// Status of the last response
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn next_page_token(&self) -> &str {
        &self.next_page_token
    }

    pub fn has_next_page(&self) -> bool {
        !self.next_page_token.is_empty()
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Set a parameter; an existing value for `key` is replaced
    pub fn set_parameter(&mut self, key: &str, value: impl Into<String>) {
        self.params.insert(key.to_string(), value.into());
    }

    /// Returns true if the parameter was present
    pub fn remove_parameter(&mut self, key: &str) -> bool {
        self.params.remove(key).is_some()
    }

    pub fn set_location(&mut self, position: &Position) {
        self.set_parameter("location", position.to_query_value());
    }

    /// Search radius in meters. Clears `rankby`.
    pub fn set_radius(&mut self, meters: u32) {
        self.remove_parameter(RANK_BY);
        self.set_parameter(RADIUS, meters.to_string());
    }

    /// Result ordering. Clears `radius`.
    pub fn set_rank_by(&mut self, rank_by: RankBy) {
        self.remove_parameter(RADIUS);
        self.set_parameter(RANK_BY, rank_by.to_string());
    }

    pub fn set_keyword(&mut self, keyword: &str) {
        self.set_parameter("keyword", keyword);
    }

    pub fn set_name(&mut self, name: &str) {
        self.set_parameter("name", name);
    }

    /// Restrict to place types, joined with `|`
    pub fn set_types<S: AsRef<str>>(&mut self, types: &[S]) {
        let joined = types.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("|");
        self.set_parameter("types", joined);
    }

    /// Only places open now; `false` removes the filter
    pub fn set_open_now(&mut self, open_now: bool) {
        if open_now {
            self.set_parameter("opennow", "true");
        } else {
            self.remove_parameter("opennow");
        }
    }

    /// Free-text query (text search)
    pub fn set_query(&mut self, query: &str) {
        self.set_parameter("query", query);
    }

    pub fn set_language(&mut self, language: &str) {
        self.set_parameter("language", language);
    }

    /// URL for the first page
    pub fn url(&self) -> String {
        let query = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.endpoint, query)
    }

    fn next_page_url(&self) -> String {
        format!(
            "{}&pagetoken={}",
            self.url(),
            urlencoding::encode(&self.next_page_token)
        )
    }

    /// Fetch the first page for the current parameters
    pub async fn get_places(&mut self) -> SearchPage {
        let url = self.url();
        info!(kind = %self.kind, "searching places");
        self.run(url).await
    }

    /// Fetch the page after the last one
    ///
    /// Without a continuation token this is an `InvalidRequest` and nothing is
    /// fetched. Otherwise waits until the query interval has passed since the
    /// previous response.
    pub async fn get_next_places(&mut self) -> SearchPage {
        if self.next_page_token.is_empty() {
            warn!(kind = %self.kind, "no next page to fetch");
            self.status = StatusCode::InvalidRequest;
            return SearchPage::failed(StatusCode::InvalidRequest);
        }

        if let Some(last) = self.last_query {
            let ready = last + self.query_interval;
            if Instant::now() < ready {
                debug!(
                    wait_ms = (ready - Instant::now()).as_millis() as u64,
                    "waiting before next page"
                );
                sleep_until(ready).await;
            }
        }

        let url = self.next_page_url();
        info!(kind = %self.kind, "fetching next page");
        self.run(url).await
    }

    async fn run(&mut self, url: String) -> SearchPage {
        let completion = self.dispatcher.dispatch(Task::FetchUrl(url)).await;
        self.last_query = Some(Instant::now());

        if !completion.status.is_ok() {
            return self.fail(completion.status);
        }

        let body = completion.into_bytes().unwrap_or_default();
        let parsed = match parse_search(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("failed to parse search response: {}", e);
                return self.fail(StatusCode::Error);
            }
        };

        self.next_page_token = parsed.next_page_token;
        self.status = parsed.status;

        if !parsed.status.is_ok() {
            warn!(status = %parsed.status, "search returned no places");
            return SearchPage::failed(parsed.status);
        }

        debug!(
            places = parsed.places.len(),
            more = self.has_next_page(),
            "search page parsed"
        );
        SearchPage {
            status: StatusCode::Ok,
            places: parsed.places,
        }
    }

    fn fail(&mut self, status: StatusCode) -> SearchPage {
        self.next_page_token.clear();
        self.status = status;
        SearchPage::failed(status)
    }
}
