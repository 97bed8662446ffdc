//! Photo command handler

use crate::cli::{build_dispatcher, require_api_key};
use crate::config::Config;
use crate::details::DetailEngine;
use crate::error::{Error, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Photo command arguments
#[derive(Args)]
pub struct PhotoArgs {
    /// Photo reference from a details result
    pub reference: String,

    /// Maximum width in pixels (1-1600)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=1600))]
    pub max_width: Option<u32>,

    /// Maximum height in pixels (1-1600)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=1600))]
    pub max_height: Option<u32>,

    /// File to write the image to
    #[arg(long, short = 'o')]
    pub output: PathBuf,
}

/// Run the photo command
pub async fn run(args: PhotoArgs) -> Result<()> {
    let config = Config::load()?;
    require_api_key(&config)?;

    // Upstream needs at least one bound
    let max_width = match (args.max_width, args.max_height) {
        (None, None) => Some(800),
        (width, _) => width,
    };

    let engine = DetailEngine::from_config(build_dispatcher(&config), &config);
    let photo = engine
        .download_photo(&args.reference, max_width, args.max_height)
        .await;
    if !photo.status.is_ok() {
        return Err(Error::Status(photo.status));
    }

    fs::write(&args.output, &photo.bytes)?;
    println!("Saved {} bytes to {}", photo.bytes.len(), args.output.display());
    Ok(())
}
