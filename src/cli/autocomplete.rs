//! Autocomplete command handler

use crate::cli::{build_dispatcher, require_api_key};
use crate::config::Config;
use crate::coord::Position;
use crate::error::Result;
use crate::format::Report;
use crate::search::AutocompleteEngine;
use clap::Args;

/// Autocomplete command arguments
#[derive(Args)]
pub struct AutocompleteArgs {
    /// Partial place name or address
    pub input: String,

    /// Restrict to a type collection (e.g. geocode, establishment)
    #[arg(long, short = 't')]
    pub types: Option<String>,

    /// Latitude to bias towards
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude to bias towards
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Bias radius in meters
    #[arg(long, short = 'r', requires = "lat")]
    pub radius: Option<u32>,
}

/// Run the autocomplete command
pub async fn run(args: AutocompleteArgs) -> Result<Report> {
    let config = Config::load()?;
    require_api_key(&config)?;

    let mut engine = AutocompleteEngine::from_config(build_dispatcher(&config), &config);
    if let Some(types) = &args.types {
        engine.set_types(types);
    }
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        let position = Position::new(lat, lon);
        position.validate()?;
        match args.radius {
            Some(radius) => engine.set_location_radius(position, radius),
            None => engine.set_location(position),
        }
    }

    Ok(Report::Autocomplete(engine.predict(&args.input).await))
}
