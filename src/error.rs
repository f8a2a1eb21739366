//! Error types for the access-point engine.
//!
//! Only [`InputError`] ever reaches a caller. [`GatewayError`] describes
//! upstream provider failures, which the gateways log and absorb.

use thiserror::Error;

/// Rejected request input. No computation is attempted when this is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("parcel needs at least 3 distinct vertices, got {found}")]
    TooFewVertices { found: usize },

    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("missing query coordinate")]
    MissingCoordinate,
}

/// Failure of a single upstream provider attempt.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("{endpoint} timed out after {secs}s")]
    Timeout { endpoint: String, secs: u64 },

    #[error("malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}
