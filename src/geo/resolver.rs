//! Address resolution with a single-position cache

use crate::coord::Position;
use crate::dispatch::{Dispatcher, Task};
use crate::geo::AddressRecord;
use crate::status::StatusCode;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Terminal result of one address resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressOutcome {
    pub status: StatusCode,
    /// Addresses best match first; empty unless `status` is `Ok`
    pub addresses: Vec<AddressRecord>,
}

impl AddressOutcome {
    fn failed(status: StatusCode) -> Self {
        Self {
            status,
            addresses: Vec::new(),
        }
    }

    /// The selected (first) address
    pub fn address(&self) -> Option<&AddressRecord> {
        self.addresses.first()
    }
}

/// Reverse geocodes positions, remembering the last resolution
///
/// The cache is keyed on exact coordinate equality. Requesting any other
/// position drops the cache before the geocode is dispatched.
#[derive(Debug)]
pub struct AddressResolver {
    dispatcher: Dispatcher,
    position: Option<Position>,
    addresses: Vec<AddressRecord>,
}

impl AddressResolver {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            position: None,
            addresses: Vec::new(),
        }
    }

    /// Resolve `position` into up to `max_results` addresses
    ///
    /// Completes with exactly one outcome. A missing position is an
    /// `IllegalArgument`; a repeated position is answered from the cache.
    pub async fn resolve(&mut self, position: Option<&Position>, max_results: usize) -> AddressOutcome {
        let Some(position) = position else {
            warn!("address requested without a position");
            return AddressOutcome::failed(StatusCode::IllegalArgument);
        };

        if self.position.as_ref() == Some(position) && !self.addresses.is_empty() {
            debug!(position = %position, "address cache hit");
            return AddressOutcome {
                status: StatusCode::Ok,
                addresses: self.addresses.clone(),
            };
        }

        debug!(position = %position, "address cache miss");
        self.addresses.clear();
        self.position = Some(*position);

        let completion = self
            .dispatcher
            .dispatch(Task::ReverseGeocode {
                position: *position,
                max_results,
            })
            .await;

        match completion.status {
            StatusCode::Ok => {
                let addresses = completion.into_addresses();
                if addresses.is_empty() {
                    return AddressOutcome::failed(StatusCode::ZeroResults);
                }
                if let Some(first) = addresses.first() {
                    info!(address = %first.location_label(), "address resolved");
                }
                self.addresses = addresses.clone();
                AddressOutcome {
                    status: StatusCode::Ok,
                    addresses,
                }
            }
            status => {
                warn!(status = %status, "address resolution failed");
                AddressOutcome::failed(status)
            }
        }
    }

    /// Position of the last requested resolution
    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// All cached addresses
    pub fn addresses(&self) -> &[AddressRecord] {
        &self.addresses
    }

    /// The resolved address
    pub fn address(&self) -> Option<&AddressRecord> {
        self.addresses.first()
    }

    pub fn street_name(&self) -> Option<String> {
        self.address().map(|a| a.street_line().to_string())
    }

    pub fn city_name(&self) -> Option<String> {
        self.address().map(AddressRecord::city_line)
    }

    pub fn location_name(&self) -> Option<String> {
        self.address().map(AddressRecord::location_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeocodeError;
    use crate::testing::{FakeFetcher, FakeGeocoder};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn record(street: &str) -> AddressRecord {
        AddressRecord {
            lines: vec![street.to_string()],
            locality: Some("Springfield".to_string()),
            admin_area: Some("Illinois".to_string()),
            ..Default::default()
        }
    }

    fn resolver(geocoder: &FakeGeocoder) -> AddressResolver {
        AddressResolver::new(Dispatcher::new(
            Arc::new(FakeFetcher::new()),
            Arc::new(geocoder.clone()),
        ))
    }

    #[tokio::test]
    async fn test_missing_position_is_illegal_argument() {
        let geocoder = FakeGeocoder::new();
        let mut resolver = resolver(&geocoder);

        let outcome = resolver.resolve(None, 1).await;
        assert_eq!(outcome.status, StatusCode::IllegalArgument);
        assert!(outcome.addresses.is_empty());
        assert_eq!(geocoder.calls().load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_same_position_is_served_from_cache() {
        let geocoder = FakeGeocoder::new();
        geocoder.push(Ok(vec![record("1 Main St"), record("3 Main St")]));
        let mut resolver = resolver(&geocoder);

        let first = resolver.resolve(Some(&Position::new(1.0, 2.0)), 5).await;
        assert_eq!(first.status, StatusCode::Ok);
        assert_eq!(resolver.street_name().as_deref(), Some("1 Main St"));

        // Different timestamp, same coordinates
        let second = resolver.resolve(Some(&Position::new(1.0, 2.0)), 5).await;
        assert_eq!(second, first);
        assert_eq!(geocoder.calls().load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_new_position_invalidates_cache() {
        let geocoder = FakeGeocoder::new();
        geocoder.push(Ok(vec![record("1 Main St")]));
        geocoder.push(Err(GeocodeError::Io("offline".into())));
        let mut resolver = resolver(&geocoder);

        resolver.resolve(Some(&Position::new(1.0, 2.0)), 1).await;
        assert!(resolver.address().is_some());

        let outcome = resolver.resolve(Some(&Position::new(1.0, 2.5)), 1).await;
        assert_eq!(outcome.status, StatusCode::NetworkError);
        assert!(resolver.address().is_none());
        assert_eq!(resolver.position(), Some(&Position::new(1.0, 2.5)));
        assert_eq!(geocoder.calls().load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_result_reports_zero_results_once() {
        let geocoder = FakeGeocoder::new();
        geocoder.push(Ok(Vec::new()));
        let mut resolver = resolver(&geocoder);

        let outcome = resolver.resolve(Some(&Position::new(1.0, 2.0)), 1).await;
        assert_eq!(outcome.status, StatusCode::ZeroResults);
        assert!(outcome.addresses.is_empty());
        assert!(resolver.address().is_none());
    }

    #[tokio::test]
    async fn test_failed_resolution_is_not_cached() {
        let geocoder = FakeGeocoder::new();
        geocoder.push(Err(GeocodeError::IllegalArgument("lat".into())));
        geocoder.push(Ok(vec![record("1 Main St")]));
        let mut resolver = resolver(&geocoder);
        let position = Position::new(1.0, 2.0);

        let outcome = resolver.resolve(Some(&position), 1).await;
        assert_eq!(outcome.status, StatusCode::IllegalArgument);

        let retry = resolver.resolve(Some(&position), 1).await;
        assert_eq!(retry.status, StatusCode::Ok);
        assert_eq!(geocoder.calls().load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_derived_accessors() {
        let geocoder = FakeGeocoder::new();
        geocoder.push(Ok(vec![record("1 Main St")]));
        let mut resolver = resolver(&geocoder);

        assert_eq!(resolver.city_name(), None);
        let outcome = resolver.resolve(Some(&Position::new(1.0, 2.0)), 1).await;

        assert_eq!(outcome.address().map(|a| a.street_line()), Some("1 Main St"));
        assert_eq!(resolver.city_name().as_deref(), Some("Springfield, Illinois"));
        assert_eq!(
            resolver.location_name().as_deref(),
            Some("1 Main St, Springfield, Illinois")
        );
    }
}
