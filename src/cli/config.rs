//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "search.radius")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            show_all_config(&config);
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                return Err(Error::Config(format!(
                    "Unknown config key: {}\n\nAvailable keys:\n  {}",
                    key,
                    Config::available_keys().join("\n  ")
                )));
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            return Err(Error::Config(
                "Must specify a key to set a value".to_string(),
            ));
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[location]");
    println!("freshness_window_ms = {}", config.location.freshness_window_ms);
    println!("update_timeout_ms = {}", config.location.update_timeout_ms);
    println!("offline = {}", config.location.offline);
    println!();

    println!("[search]");
    println!("query_interval_ms = {}", config.search.query_interval_ms);
    println!("radius = {}", config.search.radius);
    println!("language = \"{}\"", config.search.language);
    println!();

    println!("[details]");
    println!("enrichment = {}", config.details.enrichment);
    println!(
        "enrichment_max_distance_m = {}",
        config.details.enrichment_max_distance_m
    );
    println!();

    println!("[endpoints]");
    println!("places_base = \"{}\"", config.endpoints.places_base);
    println!("wiki_api = \"{}\"", config.endpoints.wiki_api);
    println!("wiki_page_base = \"{}\"", config.endpoints.wiki_page_base);
    println!("nominatim = \"{}\"", config.endpoints.nominatim);
    println!("ip_api = \"{}\"", config.endpoints.ip_api);
    println!();

    println!("[http]");
    println!("timeout_secs = {}", config.http.timeout_secs);
    println!("user_agent = \"{}\"", config.http.user_agent);
    println!();

    println!("[api_keys]");
    println!("places = {}", mask_key(&config.api_keys.places));
}

fn mask_key(key: &str) -> &'static str {
    if key.is_empty() {
        "\"\" # not configured"
    } else {
        "\"***\" # configured"
    }
}
