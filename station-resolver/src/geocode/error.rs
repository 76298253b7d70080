//! Geocoding client error types.

use crate::domain::Location;

/// Errors from the reverse geocoding client.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// The API answered but had no complete address for the position
    #[error("no address found near {}, {}", .location.latitude, .location.longitude)]
    MissingAddress { location: Location },
}
