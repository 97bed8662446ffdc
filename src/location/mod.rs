//! Location acquisition
//!
//! [`LocationResolver`] returns a position either from the provider's cached
//! last-known fix (when fresh enough) or by requesting one new fix, bounded by
//! a timeout. Providers implement [`LocationProvider`]:
//! [`ip::IpLocationProvider`] for IP geolocation and
//! [`fixed::FixedLocationProvider`] for a manually supplied position.

pub mod fixed;
pub mod ip;
pub mod resolver;

use crate::coord::Position;
use crate::status::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc;

pub use resolver::LocationResolver;

/// Accuracy hint passed with a fix request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    #[default]
    High,
    Balanced,
    Low,
}

/// Failure of the provider session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Session dropped temporarily; reconnecting may succeed
    #[error("connection suspended")]
    Suspended,

    /// Session could not be established
    #[error("connection failed with code {code}")]
    Failed { code: i32 },
}

impl ConnectionError {
    /// Provider error code; a suspension that could not be recovered is -1
    pub fn code(&self) -> i32 {
        match self {
            Self::Suspended => -1,
            Self::Failed { code } => *code,
        }
    }
}

/// An event on a fix stream
#[derive(Debug, Clone, PartialEq)]
pub enum FixEvent {
    Fix(Position),
    Suspended,
    Failed { code: i32 },
}

/// Source of positions
///
/// A session is opened with [`connect`](Self::connect) and closed with
/// [`disconnect`](Self::disconnect). A fix request yields a channel that carries
/// at most one position.
pub trait LocationProvider: Send + Sync {
    /// Returns the provider name for logging
    fn name(&self) -> &'static str;

    /// Whether any positioning source is enabled
    fn has_enabled_provider(&self) -> bool;

    /// Open a session
    fn connect(&self) -> impl Future<Output = Result<(), ConnectionError>> + Send;

    /// Close the session
    fn disconnect(&self);

    /// Last cached fix, if any
    fn last_known_position(&self) -> impl Future<Output = Option<Position>> + Send;

    /// Ask for one new fix
    fn request_single_fix(
        &self,
        accuracy: Accuracy,
    ) -> impl Future<Output = Result<mpsc::Receiver<FixEvent>, ConnectionError>> + Send;

    /// Stop any outstanding fix request
    fn cancel_updates(&self);
}

/// Resolver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationState {
    Idle,
    AwaitingConnection,
    AwaitingFix,
    Resolved,
    TimedOut,
    Disabled,
}

impl LocationState {
    /// A request is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::AwaitingConnection | Self::AwaitingFix)
    }
}

impl fmt::Display for LocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingConnection => "awaiting_connection",
            Self::AwaitingFix => "awaiting_fix",
            Self::Resolved => "resolved",
            Self::TimedOut => "timed_out",
            Self::Disabled => "disabled",
        };
        f.write_str(name)
    }
}

/// Terminal result of one location request
#[derive(Debug, Clone, PartialEq)]
pub enum LocationOutcome {
    /// Resolution finished; `None` means no fix arrived before the timeout
    Located(Option<Position>),
    /// No positioning source is enabled
    Disabled,
    /// The provider session failed
    ProviderError { code: i32 },
    /// Another request on this resolver is still in flight
    Busy,
}

impl LocationOutcome {
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Located(position) => *position,
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Located(Some(_)) => StatusCode::Ok,
            Self::Located(None) => StatusCode::ZeroResults,
            Self::Disabled | Self::ProviderError { .. } => StatusCode::Error,
            Self::Busy => StatusCode::InvalidRequest,
        }
    }
}
