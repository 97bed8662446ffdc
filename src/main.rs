//! placefinder CLI entry point
//!
//! Location, address and places lookup

use placefinder::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
