//! Manually supplied position

use super::{Accuracy, ConnectionError, FixEvent, LocationProvider};
use crate::coord::Position;
use tokio::sync::mpsc;

/// Provider that always reports the same coordinates
///
/// Every fix is stamped with the current time.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationProvider {
    latitude: f64,
    longitude: f64,
}

impl FixedLocationProvider {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn fix(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}

impl LocationProvider for FixedLocationProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn has_enabled_provider(&self) -> bool {
        true
    }

    async fn connect(&self) -> Result<(), ConnectionError> {
        Ok(())
    }

    fn disconnect(&self) {}

    async fn last_known_position(&self) -> Option<Position> {
        Some(self.fix())
    }

    async fn request_single_fix(
        &self,
        _accuracy: Accuracy,
    ) -> Result<mpsc::Receiver<FixEvent>, ConnectionError> {
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.try_send(FixEvent::Fix(self.fix()));
        Ok(rx)
    }

    fn cancel_updates(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{LocationOutcome, LocationResolver};
    use std::time::Duration;

    #[tokio::test]
    async fn test_fixed_position_resolves() {
        let resolver = LocationResolver::new(FixedLocationProvider::new(51.5, -0.12))
            .with_freshness_window(Some(Duration::from_secs(1)));

        assert_eq!(
            resolver.request_location().await,
            LocationOutcome::Located(Some(Position::new(51.5, -0.12)))
        );
    }

    #[tokio::test]
    async fn test_fix_stream_yields_once() {
        let provider = FixedLocationProvider::new(1.0, 2.0);
        let mut fixes = provider.request_single_fix(Accuracy::Low).await.unwrap();
        assert_eq!(fixes.recv().await, Some(FixEvent::Fix(Position::new(1.0, 2.0))));
        assert_eq!(fixes.recv().await, None);
    }
}
