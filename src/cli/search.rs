//! Search command handler
//!
//! Runs a nearby, text or radar search and pages through the results.

use crate::cli::{build_dispatcher, position_or_here, require_api_key};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::Report;
use crate::search::{RankBy, SearchKind, SearchQueryEngine};
use clap::Args;
use std::str::FromStr;
use tracing::info;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Search kind: nearby, text or radar
    #[arg(long, short = 'k', default_value = "nearby")]
    pub kind: String,

    /// Free-text query (required for text search)
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// Latitude (defaults to current position)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude (defaults to current position)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Search radius in meters
    #[arg(long, short = 'r', conflicts_with = "by_distance")]
    pub radius: Option<u32>,

    /// Rank results by distance instead of prominence
    #[arg(long)]
    pub by_distance: bool,

    /// Term matched against all indexed content
    #[arg(long)]
    pub keyword: Option<String>,

    /// Term matched against place names
    #[arg(long)]
    pub name: Option<String>,

    /// Place types, comma separated
    #[arg(long, short = 't', value_delimiter = ',')]
    pub types: Vec<String>,

    /// Only places open right now
    #[arg(long)]
    pub open_now: bool,

    /// Result language
    #[arg(long)]
    pub language: Option<String>,

    /// Number of pages to fetch
    #[arg(long, short = 'p', default_value_t = 1)]
    pub pages: usize,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<Report> {
    let config = Config::load()?;
    require_api_key(&config)?;
    let kind = SearchKind::from_str(&args.kind).map_err(Error::Config)?;

    let mut engine = SearchQueryEngine::from_config(build_dispatcher(&config), kind, &config);
    configure(&mut engine, &args)?;

    if kind.is_located() || args.lat.is_some() {
        let position = position_or_here(args.lat, args.lon, &config).await?;
        engine.set_location(&position);
    }

    let mut pages = vec![engine.get_places().await];
    while pages.len() < args.pages.max(1) && engine.has_next_page() {
        info!(page = pages.len() + 1, "requesting next page");
        pages.push(engine.get_next_places().await);
    }

    Ok(Report::Search {
        search: kind,
        pages,
    })
}

fn configure(engine: &mut SearchQueryEngine, args: &SearchArgs) -> Result<()> {
    match (engine.kind(), &args.query) {
        (SearchKind::Text, Some(query)) => engine.set_query(query),
        (SearchKind::Text, None) => {
            return Err(Error::Config("Text search needs --query".to_string()));
        }
        (_, Some(query)) => engine.set_keyword(query),
        _ => {}
    }

    if let Some(radius) = args.radius {
        engine.set_radius(radius);
    }
    if args.by_distance {
        engine.set_rank_by(RankBy::Distance);
    }
    if let Some(keyword) = &args.keyword {
        engine.set_keyword(keyword);
    }
    if let Some(name) = &args.name {
        engine.set_name(name);
    }
    if !args.types.is_empty() {
        engine.set_types(&args.types);
    }
    engine.set_open_now(args.open_now);
    if let Some(language) = &args.language {
        engine.set_language(language);
    }
    Ok(())
}
