//! Location resolver state machine
//!
//! ```text
//! Idle -> AwaitingConnection -> AwaitingFix -> Resolved | TimedOut
//!   \-> Disabled           \-> Resolved (fresh cached fix)
//! ```
//!
//! Connection failures report a provider error and return to `Idle`. A
//! suspended session is reconnected once per request. Only one request may be
//! in flight; a second one is answered with [`LocationOutcome::Busy`].

use super::{Accuracy, ConnectionError, FixEvent, LocationOutcome, LocationProvider, LocationState};
use crate::config::LocationConfig;
use crate::coord::Position;
use crate::constants::timing::LOCATION_UPDATE_TIMEOUT_MS;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, info, warn};

/// Resolves the current position through a [`LocationProvider`]
pub struct LocationResolver<P: LocationProvider> {
    provider: P,
    freshness_window: Option<Duration>,
    update_timeout: Duration,
    accuracy: Accuracy,
    state: Mutex<LocationState>,
    position: Mutex<Option<Position>>,
}

impl<P: LocationProvider> LocationResolver<P> {
    /// Resolver with no freshness check and the default fix timeout
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            freshness_window: None,
            update_timeout: Duration::from_millis(LOCATION_UPDATE_TIMEOUT_MS),
            accuracy: Accuracy::default(),
            state: Mutex::new(LocationState::Idle),
            position: Mutex::new(None),
        }
    }

    pub fn from_config(provider: P, config: &LocationConfig) -> Self {
        Self::new(provider)
            .with_freshness_window(config.freshness_window())
            .with_update_timeout(config.update_timeout())
    }

    /// Maximum age of an acceptable cached fix; `None` (or zero) accepts any
    pub fn with_freshness_window(mut self, window: Option<Duration>) -> Self {
        self.freshness_window = window.filter(|w| !w.is_zero());
        self
    }

    pub fn with_update_timeout(mut self, timeout: Duration) -> Self {
        self.update_timeout = timeout;
        self
    }

    pub fn with_accuracy(mut self, accuracy: Accuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn state(&self) -> LocationState {
        *self.lock_state()
    }

    /// Position from the last completed request (or set manually)
    pub fn position(&self) -> Option<Position> {
        *self.lock_position()
    }

    /// Override the stored position
    pub fn set_position(&self, position: Position) {
        *self.lock_position() = Some(position);
    }

    /// Resolve the current position
    ///
    /// Always completes with exactly one outcome. A fix that does not arrive
    /// within the update timeout yields `Located(None)`.
    pub async fn request_location(&self) -> LocationOutcome {
        {
            let mut state = self.lock_state();
            if state.is_busy() {
                warn!(state = %*state, "location request already in flight");
                return LocationOutcome::Busy;
            }
            if !self.provider.has_enabled_provider() {
                warn!(provider = self.provider.name(), "location service disabled");
                *state = LocationState::Disabled;
                return LocationOutcome::Disabled;
            }
            *state = LocationState::AwaitingConnection;
        }

        let request = InFlight { resolver: self };
        let (outcome, terminal) = self.resolve().await;
        request.finish(terminal);

        if let LocationOutcome::Located(position) = &outcome {
            *self.lock_position() = *position;
        }
        outcome
    }

    async fn resolve(&self) -> (LocationOutcome, LocationState) {
        if let Err(e) = self.connect_with_retry().await {
            warn!(provider = self.provider.name(), "connection failed: {}", e);
            return (LocationOutcome::ProviderError { code: e.code() }, LocationState::Idle);
        }

        if let Some(last) = self.provider.last_known_position().await {
            if self.accepts(&last) {
                info!(position = %last, "using last known position");
                self.provider.disconnect();
                return (LocationOutcome::Located(Some(last)), LocationState::Resolved);
            }
            debug!(position = %last, "last known position is stale");
        }

        self.set_state(LocationState::AwaitingFix);
        let deadline = Instant::now() + self.update_timeout;
        debug!(timeout_ms = self.update_timeout.as_millis() as u64, "requesting new fix");

        let mut fixes = match timeout_at(deadline, self.provider.request_single_fix(self.accuracy)).await {
            Ok(Ok(fixes)) => fixes,
            Err(_) => return self.timed_out(),
            Ok(Err(e)) => {
                warn!("fix request failed: {}", e);
                self.end_session();
                return (LocationOutcome::ProviderError { code: e.code() }, LocationState::Idle);
            }
        };

        let mut reconnected = false;
        loop {
            tokio::select! {
                event = fixes.recv() => match event {
                    Some(FixEvent::Fix(position)) => {
                        info!(position = %position, "received new fix");
                        self.end_session();
                        return (LocationOutcome::Located(Some(position)), LocationState::Resolved);
                    }
                    Some(FixEvent::Suspended) if !reconnected => {
                        reconnected = true;
                        info!("session suspended while waiting for fix, reconnecting");
                        match timeout_at(deadline, self.provider.connect()).await {
                            Ok(Ok(())) => continue,
                            Ok(Err(e)) => {
                                warn!("reconnect failed: {}", e);
                                self.end_session();
                                return (
                                    LocationOutcome::ProviderError { code: e.code() },
                                    LocationState::Idle,
                                );
                            }
                            Err(_) => return self.timed_out(),
                        }
                    }
                    Some(FixEvent::Suspended) => {
                        warn!("session suspended again, giving up");
                        self.end_session();
                        let code = ConnectionError::Suspended.code();
                        return (LocationOutcome::ProviderError { code }, LocationState::Idle);
                    }
                    Some(FixEvent::Failed { code }) => {
                        warn!(code, "fix stream failed");
                        self.end_session();
                        return (LocationOutcome::ProviderError { code }, LocationState::Idle);
                    }
                    None => {
                        debug!("fix stream closed without a position");
                        self.end_session();
                        return (LocationOutcome::Located(None), LocationState::Resolved);
                    }
                },
                _ = sleep_until(deadline) => return self.timed_out(),
            }
        }
    }

    async fn connect_with_retry(&self) -> Result<(), ConnectionError> {
        match self.provider.connect().await {
            Err(ConnectionError::Suspended) => {
                info!("connection suspended, retrying once");
                self.provider.connect().await
            }
            other => other,
        }
    }

    fn timed_out(&self) -> (LocationOutcome, LocationState) {
        info!(
            timeout_ms = self.update_timeout.as_millis() as u64,
            "no fix before timeout"
        );
        self.end_session();
        (LocationOutcome::Located(None), LocationState::TimedOut)
    }

    fn accepts(&self, last: &Position) -> bool {
        match self.freshness_window {
            None => true,
            Some(window) => last.is_fresh(window, Utc::now()),
        }
    }

    fn end_session(&self) {
        self.provider.cancel_updates();
        self.provider.disconnect();
    }

    fn set_state(&self, state: LocationState) {
        *self.lock_state() = state;
    }

    fn lock_state(&self) -> MutexGuard<'_, LocationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_position(&self) -> MutexGuard<'_, Option<Position>> {
        self.position.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Marks a request in flight; if the request future is dropped before
/// finishing, the session is torn down and the resolver returns to `Idle`.
struct InFlight<'a, P: LocationProvider> {
    resolver: &'a LocationResolver<P>,
}

impl<P: LocationProvider> InFlight<'_, P> {
    fn finish(self, terminal: LocationState) {
        self.resolver.set_state(terminal);
        std::mem::forget(self);
    }
}

impl<P: LocationProvider> Drop for InFlight<'_, P> {
    fn drop(&mut self) {
        debug!("location request abandoned");
        self.resolver.end_session();
        self.resolver.set_state(LocationState::Idle);
    }
}
