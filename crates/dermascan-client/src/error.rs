use std::fmt;

use thiserror::Error;

/// Which remote service a request was aimed at. Used to phrase failures the
/// way the user sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Classification,
    Directory,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Classification => write!(f, "Prediction"),
            Endpoint::Directory => write!(f, "Doctor lookup"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} failed ({status})")]
    Status { endpoint: Endpoint, status: u16 },

    #[error("{endpoint} failed (empty response)")]
    EmptyResponse { endpoint: Endpoint },

    #[error("invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The supplied image could not be re-encoded as JPEG.
    #[error("image encoding error: {0}")]
    Encode(#[from] image::ImageError),
}
