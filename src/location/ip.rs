//! IP-based location provider
//!
//! Uses ip-api.com for IP geolocation. The last successful fix is written to a
//! cache file and served back as the provider's last-known position; the
//! resolver decides whether it is fresh enough.

use super::{Accuracy, ConnectionError, FixEvent, LocationProvider};
use crate::config::Config;
use crate::constants::cache::LAST_FIX_CACHE_FILE;
use crate::coord::Position;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// IP location provider with a last-fix cache
#[derive(Debug)]
pub struct IpLocationProvider {
    client: reqwest::Client,
    endpoint: String,
    cache_path: Option<PathBuf>,
    offline: bool,
    pending: Mutex<Option<JoinHandle<()>>>,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    country: Option<String>,
}

/// Cached fix
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedFix {
    position: Position,
    label: String,
}

impl IpLocationProvider {
    /// Create a provider for `endpoint` with the default cache path
    pub fn new(endpoint: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        let cache_path = dirs::cache_dir()
            .map(|p| p.join(crate::config::defaults::APP_DIR_NAME).join(LAST_FIX_CACHE_FILE));

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            cache_path,
            offline: false,
            pending: Mutex::new(None),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.endpoints.ip_api.clone(),
            config.http.timeout(),
            &config.http.user_agent,
        )?
        .offline(config.location.offline))
    }

    /// Use a specific cache file
    pub fn with_cache_path(mut self, cache_path: PathBuf) -> Self {
        self.cache_path = Some(cache_path);
        self
    }

    /// Disable the last-fix cache
    pub fn without_cache(mut self) -> Self {
        self.cache_path = None;
        self
    }

    /// An offline provider reports that no positioning source is enabled
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        if let Some(cache_path) = &self.cache_path {
            let _ = fs::remove_file(cache_path);
        }
    }

    async fn load_cache(&self) -> Option<CachedFix> {
        let cache_path = self.cache_path.as_ref()?;
        let content = tokio::fs::read_to_string(cache_path).await.ok()?;
        match serde_json::from_str(&content) {
            Ok(cached) => Some(cached),
            Err(e) => {
                debug!("ignoring unreadable fix cache: {}", e);
                None
            }
        }
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

async fn save_cache(cache_path: Option<&PathBuf>, fix: &CachedFix) {
    let Some(cache_path) = cache_path else {
        return;
    };

    if let Some(parent) = cache_path.parent() {
        let _ = tokio::fs::create_dir_all(parent).await;
    }

    if let Ok(content) = serde_json::to_string_pretty(fix) {
        if let Err(e) = tokio::fs::write(cache_path, content).await {
            warn!("failed to write fix cache: {}", e);
        }
    }
}

/// Query the endpoint once
async fn fetch_fix(client: &reqwest::Client, endpoint: &str) -> Result<CachedFix> {
    let response = client
        .get(endpoint)
        .send()
        .await
        .map_err(|e| Error::Location(format!("IP location request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(Error::Location(format!(
            "IP location API returned status: {}",
            response.status()
        )));
    }

    let data: IpApiResponse = response
        .json()
        .await
        .map_err(|e| Error::Location(format!("Failed to parse IP location response: {}", e)))?;

    parse_response(data)
}

fn parse_response(data: IpApiResponse) -> Result<CachedFix> {
    if data.status != "success" {
        return Err(Error::Location("IP location lookup failed".to_string()));
    }

    let lat = data
        .lat
        .ok_or_else(|| Error::Location("No latitude in response".to_string()))?;
    let lon = data
        .lon
        .ok_or_else(|| Error::Location("No longitude in response".to_string()))?;

    let position = Position::new(lat, lon);
    position.validate()?;

    let label = [data.city, data.region_name, data.country]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

    Ok(CachedFix { position, label })
}

impl LocationProvider for IpLocationProvider {
    fn name(&self) -> &'static str {
        "ip-api"
    }

    fn has_enabled_provider(&self) -> bool {
        !self.offline
    }

    async fn connect(&self) -> std::result::Result<(), ConnectionError> {
        debug!(endpoint = %self.endpoint, "ip location session opened");
        Ok(())
    }

    fn disconnect(&self) {
        debug!("ip location session closed");
    }

    async fn last_known_position(&self) -> Option<Position> {
        self.load_cache().await.map(|cached| cached.position)
    }

    async fn request_single_fix(
        &self,
        _accuracy: Accuracy,
    ) -> std::result::Result<mpsc::Receiver<FixEvent>, ConnectionError> {
        let (tx, rx) = mpsc::channel(1);
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let cache_path = self.cache_path.clone();

        let handle = tokio::spawn(async move {
            match fetch_fix(&client, &endpoint).await {
                Ok(fix) => {
                    info!(position = %fix.position, label = %fix.label, "ip location resolved");
                    save_cache(cache_path.as_ref(), &fix).await;
                    let _ = tx.send(FixEvent::Fix(fix.position)).await;
                }
                // Dropping the sender closes the stream without a position
                Err(e) => warn!("{}", e),
            }
        });

        if let Some(previous) = self.lock_pending().replace(handle) {
            previous.abort();
        }
        Ok(rx)
    }

    fn cancel_updates(&self) {
        if let Some(handle) = self.lock_pending().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn provider(endpoint: &str) -> IpLocationProvider {
        IpLocationProvider::new(endpoint, Duration::from_millis(500), "test").unwrap()
    }

    fn success() -> IpApiResponse {
        IpApiResponse {
            status: "success".to_string(),
            lat: Some(40.7128),
            lon: Some(-74.0060),
            city: Some("New York".to_string()),
            region_name: Some("New York".to_string()),
            country: Some("United States".to_string()),
        }
    }

    #[test]
    fn test_parse_response() {
        let fix = parse_response(success()).unwrap();
        assert_eq!(fix.position, Position::new(40.7128, -74.0060));
        assert_eq!(fix.label, "New York, New York, United States");
    }

    #[test]
    fn test_parse_response_failures() {
        let failed = IpApiResponse {
            status: "fail".to_string(),
            ..success()
        };
        assert!(parse_response(failed).is_err());

        let no_lat = IpApiResponse {
            lat: None,
            ..success()
        };
        assert!(parse_response(no_lat).is_err());

        let out_of_range = IpApiResponse {
            lat: Some(123.0),
            ..success()
        };
        assert!(parse_response(out_of_range).is_err());
    }

    #[tokio::test]
    async fn test_cache_serves_last_known_position() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join("fix.json");
        let provider = provider("http://127.0.0.1:9/").with_cache_path(cache_path.clone());

        assert!(provider.last_known_position().await.is_none());

        let fix = parse_response(success()).unwrap();
        save_cache(Some(&cache_path), &fix).await;
        let loaded = provider.last_known_position().await.unwrap();
        assert_eq!(loaded, fix.position);
        assert_eq!(loaded.timestamp, fix.position.timestamp);

        provider.clear_cache();
        assert!(provider.last_known_position().await.is_none());
    }

    #[tokio::test]
    async fn test_cache_written_into_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join("nested").join("fix.json");
        let provider = provider("http://127.0.0.1:9/").with_cache_path(cache_path.clone());

        let fix = parse_response(success()).unwrap();
        save_cache(Some(&cache_path), &fix).await;

        assert!(cache_path.exists());
        assert_eq!(provider.last_known_position().await, Some(fix.position));
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join("fix.json");
        fs::write(&cache_path, "not json").unwrap();
        let provider = provider("http://127.0.0.1:9/").with_cache_path(cache_path);

        assert!(provider.last_known_position().await.is_none());
    }

    #[test]
    fn test_offline_provider_is_disabled() {
        let provider = provider("http://127.0.0.1:9/").without_cache();
        assert!(provider.has_enabled_provider());
        assert!(!provider.offline(true).has_enabled_provider());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_closes_stream() {
        let provider = provider("http://127.0.0.1:9/").without_cache();
        let mut fixes = provider.request_single_fix(Accuracy::High).await.unwrap();
        assert_eq!(fixes.recv().await, None);
    }
}
