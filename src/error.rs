//! Error types for placefinder

use crate::status::StatusCode;
use thiserror::Error;

/// Main error type for placefinder operations
///
/// The resolution engines never return this type for pipeline failures; those
/// travel as a [`StatusCode`](crate::status::StatusCode) inside each outcome.
/// It covers configuration, CLI plumbing and the concrete providers.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Location error: {0}")]
    Location(String),

    /// A pipeline request finished with a non-OK status
    #[error("{}: {}", .0, .0.description())]
    Status(StatusCode),
}

/// Result type alias for placefinder operations
pub type Result<T> = std::result::Result<T, Error>;
