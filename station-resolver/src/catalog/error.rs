//! Catalog ingestion error types.

use crate::cts::CtsError;
use crate::geocode::GeocodeError;

/// Errors that can occur while rebuilding or restoring the catalog.
///
/// None of these are fatal at runtime: a failed refresh leaves the
/// published catalog in place, and startup falls back to the snapshot.
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    /// The stop feed could not be fetched
    #[error("stop feed error: {0}")]
    Feed(#[from] CtsError),

    /// Reverse geocoding failed under the abort policy
    #[error("geocoding error: {0}")]
    Geocoding(#[from] GeocodeError),

    /// The snapshot could not be read, written or verified
    #[error("snapshot error: {message}")]
    Snapshot { message: String },

    /// No snapshot exists to fall back to
    #[error("no catalog snapshot at {path}")]
    NoSnapshot { path: String },
}
