//! Error types for quakemap.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur while fetching, parsing or rendering feeds.
#[derive(Error, Debug)]
pub enum QuakemapError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Feed endpoint returned an error status
    #[error("feed request to {url} failed (HTTP {status}): {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    /// Invalid response structure
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A feature is missing coordinates or magnitude, or holds non-numeric values
    #[error("malformed feature #{index}: {reason}")]
    MalformedFeature { index: usize, reason: String },
}

impl QuakemapError {
    /// Build a malformed-feature error.
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedFeature {
            index,
            reason: reason.into(),
        }
    }
}
