//! Locate command handler
//!
//! Resolves the current position and optionally reverse geocodes it.

use crate::cli::build_dispatcher;
use crate::config::Config;
use crate::coord::Position;
use crate::error::Result;
use crate::format::Report;
use crate::geo::AddressResolver;
use crate::location::fixed::FixedLocationProvider;
use crate::location::ip::IpLocationProvider;
use crate::location::{LocationOutcome, LocationProvider, LocationResolver, LocationState};
use clap::Args;

/// Locate command arguments
#[derive(Args)]
pub struct LocateArgs {
    /// Latitude of a manual position
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of a manual position
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Also resolve the street address
    #[arg(long, short = 'a')]
    pub address: bool,

    /// Maximum number of addresses to request
    #[arg(long, default_value_t = 1)]
    pub max_results: usize,

    /// Accept a cached fix no older than this many milliseconds (0 accepts any)
    #[arg(long)]
    pub freshness_ms: Option<u64>,

    /// Give up waiting for a fresh fix after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Forget the cached fix before resolving
    #[arg(long)]
    pub refresh: bool,
}

/// Run the locate command
pub async fn run(args: LocateArgs) -> Result<Report> {
    let mut config = Config::load()?;
    if let Some(freshness) = args.freshness_ms {
        config.location.freshness_window_ms = freshness;
    }
    if let Some(timeout) = args.timeout_ms {
        config.location.update_timeout_ms = timeout;
    }

    let (outcome, state) = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => {
            Position::new(lat, lon).validate()?;
            resolve(LocationResolver::from_config(
                FixedLocationProvider::new(lat, lon),
                &config.location,
            ))
            .await
        }
        _ => {
            let provider = IpLocationProvider::from_config(&config)?;
            if args.refresh {
                provider.clear_cache();
            }
            resolve(LocationResolver::from_config(provider, &config.location)).await
        }
    };

    let position = outcome.position();
    let address = match (&position, args.address) {
        (Some(position), true) => {
            let mut resolver = AddressResolver::new(build_dispatcher(&config));
            Some(resolver.resolve(Some(position), args.max_results.max(1)).await)
        }
        _ => None,
    };

    // An address failure is reported through the address section
    let status = match &address {
        Some(address) if outcome.status().is_ok() => address.status,
        _ => outcome.status(),
    };

    Ok(Report::Location {
        status,
        state,
        position,
        address,
    })
}

async fn resolve<P: LocationProvider>(
    resolver: LocationResolver<P>,
) -> (LocationOutcome, LocationState) {
    let outcome = resolver.request_location().await;
    (outcome, resolver.state())
}
