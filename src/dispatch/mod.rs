//! Task dispatcher
//!
//! Runs one unit of blocking work (a URL fetch or a reverse geocode) on a
//! worker thread and delivers exactly one [`Completion`] to the caller's
//! callback. The dispatcher classifies failures into a [`StatusCode`]; it does
//! not retry and does not cache.

pub mod fetcher;

use crate::coord::Position;
use crate::geo::{AddressRecord, GeocodeError, GeocodingProvider};
use crate::status::StatusCode;
use fetcher::{FetchError, HttpFetcher};
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub use fetcher::ReqwestFetcher;

/// A unit of work
#[derive(Debug, Clone)]
pub enum Task {
    /// GET a URL and return the body bytes
    FetchUrl(String),
    /// Reverse geocode a position
    ReverseGeocode { position: Position, max_results: usize },
}

impl Task {
    fn kind(&self) -> &'static str {
        match self {
            Self::FetchUrl(_) => "fetch_url",
            Self::ReverseGeocode { .. } => "reverse_geocode",
        }
    }
}

/// Data produced by a task
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    Empty,
    Bytes(Vec<u8>),
    Addresses(Vec<AddressRecord>),
}

/// Terminal result of a task
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub status: StatusCode,
    pub payload: Payload,
}

impl Completion {
    pub fn ok(payload: Payload) -> Self {
        Self {
            status: StatusCode::Ok,
            payload,
        }
    }

    pub fn failed(status: StatusCode) -> Self {
        Self {
            status,
            payload: Payload::Empty,
        }
    }

    /// Response body, if this completion carries one
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self.payload {
            Payload::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Geocoded addresses; empty for any other payload
    pub fn into_addresses(self) -> Vec<AddressRecord> {
        match self.payload {
            Payload::Addresses(addresses) => addresses,
            _ => Vec::new(),
        }
    }
}

/// Runs tasks off the caller's thread
///
/// Cheap to clone; every engine holds its own handle.
#[derive(Clone)]
pub struct Dispatcher {
    fetcher: Arc<dyn HttpFetcher>,
    geocoder: Arc<dyn GeocodingProvider>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("fetcher", &"<fetcher>")
            .field("geocoder", &self.geocoder.name())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, geocoder: Arc<dyn GeocodingProvider>) -> Self {
        Self { fetcher, geocoder }
    }

    /// Run `task` on a worker and hand its completion to `callback`
    ///
    /// The callback runs exactly once, on a runtime task rather than the
    /// submitting thread. Must be called from within a tokio runtime.
    pub fn submit<F>(&self, task: Task, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Completion) + Send + 'static,
    {
        let fetcher = Arc::clone(&self.fetcher);
        let geocoder = Arc::clone(&self.geocoder);
        let kind = task.kind();
        debug!(task = kind, "submitting task");

        tokio::spawn(async move {
            let completion =
                match tokio::task::spawn_blocking(move || run(fetcher.as_ref(), geocoder.as_ref(), task))
                    .await
                {
                    Ok(completion) => completion,
                    Err(e) => {
                        warn!(task = kind, "worker did not complete: {}", e);
                        Completion::failed(StatusCode::Error)
                    }
                };
            debug!(task = kind, status = %completion.status, "task completed");
            callback(completion);
        })
    }

    /// Run `task` and wait for its completion
    pub async fn dispatch(&self, task: Task) -> Completion {
        let (tx, rx) = oneshot::channel();
        self.submit(task, move |completion| {
            let _ = tx.send(completion);
        });
        rx.await
            .unwrap_or_else(|_| Completion::failed(StatusCode::Error))
    }
}

/// Execute one task synchronously and classify the outcome
fn run(fetcher: &dyn HttpFetcher, geocoder: &dyn GeocodingProvider, task: Task) -> Completion {
    match task {
        Task::FetchUrl(url) => classify_fetch(fetcher.fetch(&url)),
        Task::ReverseGeocode {
            position,
            max_results,
        } => {
            if !geocoder.is_present() {
                warn!(geocoder = geocoder.name(), "geocoder is not available");
                return Completion::failed(StatusCode::Error);
            }
            classify_geocode(geocoder.reverse_geocode(
                position.latitude,
                position.longitude,
                max_results,
            ))
        }
    }
}

fn classify_fetch(result: Result<Vec<u8>, FetchError>) -> Completion {
    match result {
        Ok(body) => Completion::ok(Payload::Bytes(body)),
        Err(e @ (FetchError::InvalidUrl(_) | FetchError::Io(_))) => {
            warn!("fetch failed: {}", e);
            Completion::failed(StatusCode::NetworkError)
        }
        Err(e @ FetchError::Other(_)) => {
            warn!("fetch failed: {}", e);
            Completion::failed(StatusCode::Error)
        }
    }
}

fn classify_geocode(result: Result<Vec<AddressRecord>, GeocodeError>) -> Completion {
    match result {
        Ok(addresses) if addresses.is_empty() => {
            debug!("geocoder returned no addresses");
            Completion::failed(StatusCode::ZeroResults)
        }
        Ok(addresses) => Completion::ok(Payload::Addresses(addresses)),
        Err(e @ GeocodeError::IllegalArgument(_)) => {
            warn!("reverse geocode rejected: {}", e);
            Completion::failed(StatusCode::IllegalArgument)
        }
        Err(e @ GeocodeError::Io(_)) => {
            warn!("reverse geocode failed: {}", e);
            Completion::failed(StatusCode::NetworkError)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFetcher, FakeGeocoder};
    use std::sync::Mutex;

    fn dispatcher(fetcher: FakeFetcher, geocoder: FakeGeocoder) -> Dispatcher {
        Dispatcher::new(Arc::new(fetcher), Arc::new(geocoder))
    }

    #[tokio::test]
    async fn test_fetch_success_carries_body() {
        let fetcher = FakeFetcher::new();
        fetcher.respond("https://example.test/a", Ok(b"hello".to_vec()));
        let d = dispatcher(fetcher, FakeGeocoder::new());

        let completion = d.dispatch(Task::FetchUrl("https://example.test/a".into())).await;
        assert_eq!(completion.status, StatusCode::Ok);
        assert_eq!(completion.into_bytes(), Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_empty_body_is_still_ok() {
        let fetcher = FakeFetcher::new();
        fetcher.respond("https://example.test/empty", Ok(Vec::new()));
        let d = dispatcher(fetcher, FakeGeocoder::new());

        let completion = d.dispatch(Task::FetchUrl("https://example.test/empty".into())).await;
        assert_eq!(completion.status, StatusCode::Ok);
        assert_eq!(completion.into_bytes(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_fetch_error_classification() {
        let fetcher = FakeFetcher::new();
        fetcher.respond("bad", Err(FetchError::InvalidUrl("bad".into())));
        fetcher.respond("io", Err(FetchError::Io("reset".into())));
        fetcher.respond("other", Err(FetchError::Other("boom".into())));
        let d = dispatcher(fetcher, FakeGeocoder::new());

        assert_eq!(d.dispatch(Task::FetchUrl("bad".into())).await.status, StatusCode::NetworkError);
        assert_eq!(d.dispatch(Task::FetchUrl("io".into())).await.status, StatusCode::NetworkError);
        assert_eq!(d.dispatch(Task::FetchUrl("other".into())).await.status, StatusCode::Error);
    }

    #[tokio::test]
    async fn test_geocode_classification() {
        let position = Position::new(1.0, 2.0);
        let task = || Task::ReverseGeocode {
            position,
            max_results: 1,
        };

        let geocoder = FakeGeocoder::new();
        geocoder.push(Err(GeocodeError::IllegalArgument("lat".into())));
        geocoder.push(Err(GeocodeError::Io("offline".into())));
        geocoder.push(Ok(Vec::new()));
        geocoder.push(Ok(vec![AddressRecord::default()]));
        let d = dispatcher(FakeFetcher::new(), geocoder);

        assert_eq!(d.dispatch(task()).await.status, StatusCode::IllegalArgument);
        assert_eq!(d.dispatch(task()).await.status, StatusCode::NetworkError);
        assert_eq!(d.dispatch(task()).await.status, StatusCode::ZeroResults);

        let completion = d.dispatch(task()).await;
        assert_eq!(completion.status, StatusCode::Ok);
        assert_eq!(completion.into_addresses().len(), 1);
    }

    #[tokio::test]
    async fn test_absent_geocoder_reports_error() {
        let geocoder = FakeGeocoder::new();
        geocoder.set_present(false);
        let calls = geocoder.calls();
        let d = dispatcher(FakeFetcher::new(), geocoder);

        let completion = d
            .dispatch(Task::ReverseGeocode {
                position: Position::new(1.0, 2.0),
                max_results: 1,
            })
            .await;
        assert_eq!(completion.status, StatusCode::Error);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_invokes_callback_exactly_once() {
        let fetcher = FakeFetcher::new();
        fetcher.respond("u", Ok(b"x".to_vec()));
        let d = dispatcher(fetcher, FakeGeocoder::new());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        d.submit(Task::FetchUrl("u".into()), move |completion| {
            sink.lock().unwrap().push(completion.status);
        })
        .await
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![StatusCode::Ok]);
    }
}
