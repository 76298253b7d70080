//! Caller-facing lookup errors.
//!
//! Every failure a search or schedule query can report to its caller is one
//! of these variants. Transport problems on individual stops are not errors
//! at this level; they show up in `ScheduleReport::failed_stops`.

use crate::cts::CtsError;

use super::StopCode;

/// Errors returned by search, reference decoding and schedule queries.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// No station matches the query
    #[error("no station matches {query:?}")]
    NotFound { query: String },

    /// None of the requested stops produced a usable schedule
    #[error("no schedule available for {}: {reason}", join_codes(.stop_codes))]
    ScheduleUnavailable {
        stop_codes: Vec<StopCode>,
        reason: String,
    },

    /// The reference was issued against another catalog version
    #[error("station reference is stale (catalog {reference_hash}, current {current_hash})")]
    StaleReference {
        reference_hash: String,
        current_hash: String,
    },

    /// The reference is malformed or points outside the catalog
    #[error("invalid station reference: {reason}")]
    InvalidReference { reason: &'static str },

    /// The live-visit feed broke its response contract
    #[error(transparent)]
    Contract(CtsError),
}

fn join_codes(codes: &[StopCode]) -> String {
    codes
        .iter()
        .map(StopCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
