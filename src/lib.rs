//! placefinder: location, address and places lookup
//!
//! A library and CLI tool that resolves the device position, reverse geocodes
//! it and queries a places web API for nearby points of interest.
//!
//! ## Features
//!
//! - Position resolution with a freshness window and a bounded wait for a fix
//! - Reverse geocoding with a per-position address cache
//! - Nearby, text and radar search with throttled paging
//! - Place details with encyclopedia enrichment and photo download
//! - Every outcome carries a single upstream status code
//!
//! ## Quick Start
//!
//! ```rust
//! use placefinder::StatusCode;
//!
//! let status = StatusCode::from_api("ZERO_RESULTS");
//! assert_eq!(status, StatusCode::ZeroResults);
//! assert!(!status.is_ok());
//!
//! // Anything unrecognized is treated as a generic failure
//! assert_eq!(StatusCode::from_api("SOMETHING_NEW"), StatusCode::Error);
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod details;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod geo;
pub mod location;
pub mod search;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::Config;
pub use coord::Position;
pub use details::DetailEngine;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use geo::AddressResolver;
pub use location::LocationResolver;
pub use search::SearchQueryEngine;
pub use status::StatusCode;
