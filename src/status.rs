//! Status codes
//!
//! Every terminal outcome in the pipeline carries exactly one [`StatusCode`].
//! The upstream places API reports its own status as a string; [`StatusCode::from_api`]
//! and [`StatusCode::as_api_str`] map between the two.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome status of an asynchronous operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    UnknownError,
    NotFound,
    NetworkError,
    IllegalArgument,
    Error,
}

impl StatusCode {
    /// Map an upstream `status` string. Anything unrecognized is `Error`.
    pub fn from_api(status: &str) -> Self {
        match status {
            "OK" => Self::Ok,
            "ZERO_RESULTS" => Self::ZeroResults,
            "OVER_QUERY_LIMIT" => Self::OverQueryLimit,
            "REQUEST_DENIED" => Self::RequestDenied,
            "INVALID_REQUEST" => Self::InvalidRequest,
            "UNKNOWN_ERROR" => Self::UnknownError,
            "NOT_FOUND" => Self::NotFound,
            _ => Self::Error,
        }
    }

    /// The upstream string for this code
    ///
    /// `NetworkError` and `IllegalArgument` never come from upstream; they get
    /// their own names so that logs stay unambiguous.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::ZeroResults => "ZERO_RESULTS",
            Self::OverQueryLimit => "OVER_QUERY_LIMIT",
            Self::RequestDenied => "REQUEST_DENIED",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::NetworkError => "NETWORK_ERROR",
            Self::IllegalArgument => "ILLEGAL_ARGUMENT",
            Self::Error => "ERROR",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Human-readable explanation
    pub fn description(&self) -> &'static str {
        match self {
            Self::Ok => "Request succeeded",
            Self::ZeroResults => "No results found",
            Self::OverQueryLimit => "Query quota exceeded",
            Self::RequestDenied => "Request denied (check the API key)",
            Self::InvalidRequest => "Invalid request",
            Self::UnknownError => "Server-side error, retrying may succeed",
            Self::NotFound => "Referenced place was not found",
            Self::NetworkError => "The network service is not available",
            Self::IllegalArgument => "The location is invalid",
            Self::Error => "Unexpected error",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

impl FromStr for StatusCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NETWORK_ERROR" => Ok(Self::NetworkError),
            "ILLEGAL_ARGUMENT" => Ok(Self::IllegalArgument),
            "ERROR" => Ok(Self::Error),
            other => match Self::from_api(other) {
                Self::Error => Err(format!("Unknown status code: {}", s)),
                code => Ok(code),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_api_known_values() {
        assert_eq!(StatusCode::from_api("OK"), StatusCode::Ok);
        assert_eq!(StatusCode::from_api("ZERO_RESULTS"), StatusCode::ZeroResults);
        assert_eq!(StatusCode::from_api("OVER_QUERY_LIMIT"), StatusCode::OverQueryLimit);
        assert_eq!(StatusCode::from_api("REQUEST_DENIED"), StatusCode::RequestDenied);
        assert_eq!(StatusCode::from_api("INVALID_REQUEST"), StatusCode::InvalidRequest);
        assert_eq!(StatusCode::from_api("UNKNOWN_ERROR"), StatusCode::UnknownError);
        assert_eq!(StatusCode::from_api("NOT_FOUND"), StatusCode::NotFound);
    }

    #[test]
    fn test_from_api_unrecognized_is_error() {
        assert_eq!(StatusCode::from_api(""), StatusCode::Error);
        assert_eq!(StatusCode::from_api("ok"), StatusCode::Error);
        assert_eq!(StatusCode::from_api("SOMETHING_NEW"), StatusCode::Error);
    }

    #[test]
    fn test_api_str_matches_from_api() {
        for code in [
            StatusCode::Ok,
            StatusCode::ZeroResults,
            StatusCode::OverQueryLimit,
            StatusCode::RequestDenied,
            StatusCode::InvalidRequest,
            StatusCode::UnknownError,
            StatusCode::NotFound,
        ] {
            assert_eq!(StatusCode::from_api(code.as_api_str()), code);
        }
    }

    #[test]
    fn test_from_str_accepts_local_codes() {
        assert_eq!("network_error".parse::<StatusCode>(), Ok(StatusCode::NetworkError));
        assert_eq!("ERROR".parse::<StatusCode>(), Ok(StatusCode::Error));
        assert!("bogus".parse::<StatusCode>().is_err());
    }

    #[test]
    fn test_serde_uses_api_names() {
        let json = serde_json::to_string(&StatusCode::ZeroResults).unwrap();
        assert_eq!(json, "\"ZERO_RESULTS\"");
    }
}
