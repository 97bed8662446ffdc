//! In-memory fakes for the provider seams
//!
//! Every fake is cheap to clone and shares its state, so a test can hand one
//! copy to the code under test and keep another to script responses and
//! inspect calls.

use crate::coord::Position;
use crate::dispatch::fetcher::{FetchError, HttpFetcher};
use crate::geo::{AddressRecord, GeocodeError, GeocodingProvider};
use crate::location::{Accuracy, ConnectionError, FixEvent, LocationProvider};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

type FetchResult = Result<Vec<u8>, FetchError>;

/// Pops the next scripted response; the last one repeats forever
fn next_sticky<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

/// Fetcher that answers by URL substring
///
/// The longest registered pattern contained in the URL wins. URLs with no
/// matching pattern fail with an I/O error.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    routes: Arc<Mutex<Vec<(String, VecDeque<FetchResult>)>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for URLs containing `pattern`
    pub fn respond(&self, pattern: &str, result: FetchResult) {
        let mut routes = self.routes.lock().unwrap();
        match routes.iter_mut().find(|(p, _)| p == pattern) {
            Some((_, queue)) => queue.push_back(result),
            None => routes.push((pattern.to_string(), VecDeque::from([result]))),
        }
    }

    /// Queue a JSON body for URLs containing `pattern`
    pub fn respond_json(&self, pattern: &str, body: serde_json::Value) {
        self.respond(pattern, Ok(body.to_string().into_bytes()));
    }

    /// Every URL fetched so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl HttpFetcher for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        let mut routes = self.routes.lock().unwrap();
        routes
            .iter_mut()
            .filter(|(pattern, _)| url.contains(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .and_then(|(_, queue)| next_sticky(queue))
            .unwrap_or_else(|| Err(FetchError::Io(format!("no route for {}", url))))
    }
}

/// Geocoder answering from a script
#[derive(Clone)]
pub struct FakeGeocoder {
    responses: Arc<Mutex<VecDeque<Result<Vec<AddressRecord>, GeocodeError>>>>,
    present: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            present: Arc::new(AtomicBool::new(true)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn push(&self, result: Result<Vec<AddressRecord>, GeocodeError>) {
        self.responses.lock().unwrap().push_back(result);
    }

    pub fn set_present(&self, present: bool) {
        self.present.store(present, Ordering::SeqCst);
    }

    /// Shared counter of reverse geocode calls
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl GeocodingProvider for FakeGeocoder {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_present(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }

    fn reverse_geocode(
        &self,
        _latitude: f64,
        _longitude: f64,
        max_results: usize,
    ) -> Result<Vec<AddressRecord>, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        next_sticky(&mut responses)
            .unwrap_or_else(|| Ok(Vec::new()))
            .map(|mut records| {
                records.truncate(max_results);
                records
            })
    }
}

/// What a fix request produces
#[derive(Clone)]
enum FixScript {
    /// Events sent after the given delays, then the stream closes
    Events(Vec<(Duration, FixEvent)>),
    /// The stream stays open and never yields
    Silence,
    /// The fix request itself never completes
    Hang,
}

/// Scripted location provider
#[derive(Clone)]
pub struct FakeLocationProvider {
    enabled: Arc<AtomicBool>,
    connect_results: Arc<Mutex<VecDeque<Result<(), ConnectionError>>>>,
    last_known: Arc<Mutex<Option<Position>>>,
    script: Arc<Mutex<FixScript>>,
    held: Arc<Mutex<Vec<mpsc::Sender<FixEvent>>>>,
    feeder: Arc<Mutex<Option<JoinHandle<()>>>>,
    connects: Arc<AtomicUsize>,
    disconnects: Arc<AtomicUsize>,
    cancels: Arc<AtomicUsize>,
    fix_requests: Arc<AtomicUsize>,
}

impl FakeLocationProvider {
    pub fn new() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
            connect_results: Arc::new(Mutex::new(VecDeque::new())),
            last_known: Arc::new(Mutex::new(None)),
            script: Arc::new(Mutex::new(FixScript::Silence)),
            held: Arc::new(Mutex::new(Vec::new())),
            feeder: Arc::new(Mutex::new(None)),
            connects: Arc::new(AtomicUsize::new(0)),
            disconnects: Arc::new(AtomicUsize::new(0)),
            cancels: Arc::new(AtomicUsize::new(0)),
            fix_requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Result of the next `connect` call; unscripted calls succeed
    pub fn push_connect(&self, result: Result<(), ConnectionError>) {
        self.connect_results.lock().unwrap().push_back(result);
    }

    pub fn set_last_known(&self, position: Option<Position>) {
        *self.last_known.lock().unwrap() = position;
    }

    pub fn script_fix(&self, events: Vec<(Duration, FixEvent)>) {
        *self.script.lock().unwrap() = FixScript::Events(events);
    }

    pub fn script_silence(&self) {
        *self.script.lock().unwrap() = FixScript::Silence;
    }

    pub fn hang_fix_request(&self) {
        *self.script.lock().unwrap() = FixScript::Hang;
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn fix_requests(&self) -> usize {
        self.fix_requests.load(Ordering::SeqCst)
    }
}

impl LocationProvider for FakeLocationProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn has_enabled_provider(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    async fn connect(&self) -> Result<(), ConnectionError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let next = self.connect_results.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))
    }

    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }

    async fn last_known_position(&self) -> Option<Position> {
        *self.last_known.lock().unwrap()
    }

    async fn request_single_fix(
        &self,
        _accuracy: Accuracy,
    ) -> Result<mpsc::Receiver<FixEvent>, ConnectionError> {
        self.fix_requests.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(4);
        let script = self.script.lock().unwrap().clone();
        match script {
            FixScript::Hang => std::future::pending::<()>().await,
            FixScript::Silence => self.held.lock().unwrap().push(tx),
            FixScript::Events(events) => {
                let handle = tokio::spawn(async move {
                    for (delay, event) in events {
                        tokio::time::sleep(delay).await;
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                });
                *self.feeder.lock().unwrap() = Some(handle);
            }
        }
        Ok(rx)
    }

    fn cancel_updates(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.feeder.lock().unwrap().take() {
            handle.abort();
        }
        self.held.lock().unwrap().clear();
    }
}
