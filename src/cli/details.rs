//! Details command handler

use crate::cli::{build_dispatcher, require_api_key};
use crate::config::Config;
use crate::details::DetailEngine;
use crate::error::Result;
use crate::format::Report;
use clap::Args;

/// Details command arguments
#[derive(Args)]
pub struct DetailsArgs {
    /// Place id from a search or autocomplete result
    pub place_id: String,

    /// Skip the encyclopedia summary lookup
    #[arg(long)]
    pub no_enrich: bool,
}

/// Run the details command
pub async fn run(args: DetailsArgs) -> Result<Report> {
    let config = Config::load()?;
    require_api_key(&config)?;

    let mut engine = DetailEngine::from_config(build_dispatcher(&config), &config);
    if args.no_enrich {
        engine = engine.with_enrichment(false);
    }

    Ok(Report::Details(engine.request_details(&args.place_id).await))
}
