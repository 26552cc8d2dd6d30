use std::fmt;

use thiserror::Error;

use crate::forecast::DayKey;

/// The two provider endpoints a lookup hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current conditions",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single provider request.
///
/// Payloads are plain strings so the error can live inside [`crate::FetchState`]
/// and be cloned into snapshots.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("Failed to send {endpoint} request: {message}")]
    Network { endpoint: Endpoint, message: String },

    #[error("The {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {endpoint} response: {message}")]
    Malformed { endpoint: Endpoint, message: String },

    #[error("The {endpoint} response contained no data")]
    Empty { endpoint: Endpoint },
}

impl FetchError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            FetchError::Network { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Malformed { endpoint, .. }
            | FetchError::Empty { endpoint } => *endpoint,
        }
    }
}

/// Location service errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Permission to access location was denied")]
    PermissionDenied,
    #[error("Location service unavailable: {0}")]
    Unavailable(String),
    #[error("Location error: {0}")]
    Other(String),
}

/// Rejected selection change; the selection is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No forecast is available for {0}")]
    UnknownDay(DayKey),
    #[error("No day is selected")]
    NoDaySelected,
    #[error("Hour index {index} is out of range for a day with {len} samples")]
    HourOutOfRange { index: usize, len: usize },
}
