//! Error types for tempo-organizer.

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for all library operations.
#[derive(Debug, Error)]
pub enum TempoError {
    /// A required environment variable is absent or empty.
    #[error("{0} must be set (see .env.example)")]
    MissingConfig(&'static str),

    /// A configuration value is present but unusable.
    #[error("Invalid configuration for {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    /// The authorization flow did not produce a token.
    #[error("Authorization failed: {0}")]
    Auth(String),

    /// No cached token is available.
    #[error("No cached token found. Run tempo-organizer auth")]
    NoToken,

    /// HTTP request failed.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The Web API answered with an unexpected status.
    #[error("Spotify API returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    /// Too many requests and the advised wait is too long.
    #[error("Rate limited by Spotify, retry after {0} seconds")]
    RateLimited(u64),

    /// JSON parsing failed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tempo bucket parameters do not describe a valid layout.
    #[error("Invalid tempo layout: {0}")]
    InvalidLayout(String),

    /// A track tempo cannot be placed in any bucket.
    #[error("Track tempo {tempo} is outside the allowed range [0, {max_tempo})")]
    TempoOutOfRange { tempo: f64, max_tempo: u32 },
}
