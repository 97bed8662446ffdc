//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod autocomplete;
pub mod config;
pub mod details;
pub mod locate;
pub mod photo;
pub mod search;

use crate::config::Config;
use crate::coord::Position;
use crate::dispatch::{Dispatcher, ReqwestFetcher};
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter, Report};
use crate::geo::nominatim::NominatimGeocoder;
use crate::location::ip::IpLocationProvider;
use crate::location::LocationResolver;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Location, address and places lookup
#[derive(Parser)]
#[command(name = "placefinder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log pipeline activity to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output format (text, json, gpx)
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the current position, optionally with its address
    Locate(locate::LocateArgs),

    /// Search for places
    Search(search::SearchArgs),

    /// Show full details for one place
    Details(details::DetailsArgs),

    /// Predict places from partial input
    Autocomplete(autocomplete::AutocompleteArgs),

    /// Download a place photo
    Photo(photo::PhotoArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = cli.format;
    match cli.command {
        Commands::Locate(args) => emit(locate::run(args).await?, &format),
        Commands::Search(args) => emit(search::run(args).await?, &format),
        Commands::Details(args) => emit(details::run(args).await?, &format),
        Commands::Autocomplete(args) => emit(autocomplete::run(args).await?, &format),
        Commands::Photo(args) => photo::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "placefinder=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

/// Print a report; a non-OK report becomes the command's error
fn emit(report: Report, format: &str) -> Result<()> {
    let Some(formatter) = get_formatter(format) else {
        let names = available_formats()
            .into_iter()
            .map(|f| f.name)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::Config(format!(
            "Unknown format '{}' (available: {})",
            format, names
        )));
    };

    print!("{}", formatter.format(&report)?);

    let status = report.status();
    if status.is_ok() {
        Ok(())
    } else {
        Err(Error::Status(status))
    }
}

/// Dispatcher backed by the production fetcher and geocoder
pub(crate) fn build_dispatcher(config: &Config) -> Dispatcher {
    Dispatcher::new(
        Arc::new(ReqwestFetcher::new(
            config.http.timeout(),
            config.http.user_agent.clone(),
        )),
        Arc::new(NominatimGeocoder::from_config(config)),
    )
}

/// The places API key, or a configuration error telling how to set it
pub(crate) fn require_api_key(config: &Config) -> Result<&str> {
    if config.api_keys.places.is_empty() {
        return Err(Error::Config(
            "No places API key configured (run: placefinder config api_keys.places <KEY>)"
                .to_string(),
        ));
    }
    Ok(&config.api_keys.places)
}

/// Explicit coordinates, or the current position through IP location
pub(crate) async fn position_or_here(
    lat: Option<f64>,
    lon: Option<f64>,
    config: &Config,
) -> Result<Position> {
    if let (Some(lat), Some(lon)) = (lat, lon) {
        let position = Position::new(lat, lon);
        position.validate()?;
        return Ok(position);
    }

    let provider = IpLocationProvider::from_config(config)?;
    let resolver = LocationResolver::from_config(provider, &config.location);
    let outcome = resolver.request_location().await;
    outcome.position().ok_or_else(|| {
        Error::Location(format!(
            "Could not determine current position ({})",
            outcome.status().description()
        ))
    })
}
