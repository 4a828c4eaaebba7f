//! Error types for quakereport.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur while loading earthquake feeds.
#[derive(Error, Debug)]
pub enum QuakeError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Feed server returned an error status
    #[error("feed API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid response structure
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The background fetch worker died before producing a result
    #[error("load worker failed: {0}")]
    Worker(String),
}
