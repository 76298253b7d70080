//! Data transfer objects for web requests and responses.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{NamedStation, StationCatalog, StationRef};
use crate::domain::{AggregatedStationSchedule, Direction, Lane, ScheduleReport, StopFailure};

/// Request to search stations by name.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    /// Free-text query
    pub q: String,
}

/// Summary of the published catalog.
#[derive(Debug, Serialize)]
pub struct CatalogInfo {
    /// Content hash embedded in every station reference
    pub hash: String,

    /// When the catalog was built (RFC 3339)
    pub generated_at: String,

    /// Number of named stations
    pub stations: usize,

    /// Number of extended stations across all names
    pub places: usize,
}

/// Response for station search.
#[derive(Debug, Serialize)]
pub struct StationSearchResponse {
    /// True when the query unambiguously names one station
    pub confident: bool,

    /// Matching stations, best first
    pub stations: Vec<StationResult>,
}

/// A named station in search results.
#[derive(Debug, Serialize)]
pub struct StationResult {
    /// Display name
    pub name: String,

    /// Normalized catalog key
    pub key: String,

    /// Physical places sharing this name
    pub places: Vec<PlaceResult>,
}

/// An extended station in search results.
#[derive(Debug, Serialize)]
pub struct PlaceResult {
    /// Opaque reference to pass to the schedule endpoint
    pub reference: String,

    /// Location text telling apart places with the same name
    pub descriptor: Option<String>,

    /// Stop codes served at this place
    pub stop_codes: Vec<String>,
}

/// Response for a schedule query.
#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    /// Station display name
    pub name: String,

    /// Place descriptor, if the name is ambiguous
    pub descriptor: Option<String>,

    /// Time the visits were measured against (RFC 3339)
    pub generated_at: String,

    /// Station blocks, richest first
    pub stations: Vec<StationScheduleResult>,

    /// Stops that could not be included
    pub failed_stops: Vec<FailedStopResult>,

    /// True when `failed_stops` is not empty
    pub partial: bool,
}

/// One block of merged or single-stop visits.
#[derive(Debug, Serialize)]
pub struct StationScheduleResult {
    pub stop_codes: Vec<String>,
    pub merged: bool,
    pub tram_lanes: Vec<LaneResult>,
    pub bus_lanes: Vec<LaneResult>,
}

/// Directions sharing a line name.
#[derive(Debug, Serialize)]
pub struct LaneResult {
    /// Line name
    pub name: String,
    pub directions: Vec<DirectionResult>,
}

/// A line running towards one destination.
#[derive(Debug, Serialize)]
pub struct DirectionResult {
    /// Human-readable label, e.g. "A: Parc des Sports"
    pub description: String,
    pub line: String,
    pub destination: String,
    pub via: Option<String>,
    pub mode: &'static str,
    pub visits: Vec<VisitResult>,
}

/// One upcoming visit.
#[derive(Debug, Serialize)]
pub struct VisitResult {
    /// Expected time (RFC 3339)
    pub time: String,

    /// Whole minutes from now, never negative
    pub minutes: i64,
}

/// A stop left out of a schedule response.
#[derive(Debug, Serialize)]
pub struct FailedStopResult {
    pub stop_code: String,
    pub reason: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl CatalogInfo {
    pub fn from_catalog(catalog: &StationCatalog) -> Self {
        Self {
            hash: catalog.hash().to_string(),
            generated_at: format_time(catalog.generated_at()),
            stations: catalog.len(),
            places: catalog.extended_station_count(),
        }
    }
}

impl StationResult {
    /// Create from a named station, minting one reference per place.
    pub fn from_station(catalog: &StationCatalog, station: &NamedStation) -> Self {
        let places = station
            .extended_stations
            .iter()
            .enumerate()
            .map(|(i, extended)| PlaceResult {
                reference: StationRef::new(catalog, station.id, i).to_string(),
                descriptor: extended.descriptor.clone(),
                stop_codes: extended
                    .stop_codes()
                    .iter()
                    .map(|c| c.as_str().to_string())
                    .collect(),
            })
            .collect();

        Self {
            name: station.name.clone(),
            key: station.key.clone(),
            places,
        }
    }
}

impl ScheduleResponse {
    pub fn from_report(
        name: String,
        descriptor: Option<String>,
        report: &ScheduleReport,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            descriptor,
            generated_at: format_time(now),
            stations: report
                .stations
                .iter()
                .map(|s| StationScheduleResult::from_schedule(s, now))
                .collect(),
            failed_stops: report
                .failed_stops
                .iter()
                .map(FailedStopResult::from_failure)
                .collect(),
            partial: report.is_partial(),
        }
    }
}

impl StationScheduleResult {
    fn from_schedule(schedule: &AggregatedStationSchedule, now: DateTime<Utc>) -> Self {
        let lanes = |lanes: &[Lane]| {
            lanes
                .iter()
                .map(|lane| LaneResult::from_lane(lane, now))
                .collect()
        };

        Self {
            stop_codes: schedule
                .stop_codes
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            merged: schedule.is_merged,
            tram_lanes: lanes(&schedule.tram_lanes),
            bus_lanes: lanes(&schedule.bus_lanes),
        }
    }
}

impl LaneResult {
    fn from_lane(lane: &Lane, now: DateTime<Utc>) -> Self {
        Self {
            name: lane.name.clone(),
            directions: lane
                .directions
                .iter()
                .map(|d| DirectionResult::from_direction(d, now))
                .collect(),
        }
    }
}

impl DirectionResult {
    fn from_direction(direction: &Direction, now: DateTime<Utc>) -> Self {
        Self {
            description: direction.description(),
            line: direction.line.clone(),
            destination: direction.destination.clone(),
            via: direction.via.clone(),
            mode: direction.mode.as_str(),
            visits: direction
                .visits
                .iter()
                .map(|v| VisitResult {
                    time: format_time(v.time),
                    minutes: v.minutes_until(now),
                })
                .collect(),
        }
    }
}

impl FailedStopResult {
    fn from_failure(failure: &StopFailure) -> Self {
        Self {
            stop_code: failure.stop_code.as_str().to_string(),
            reason: failure.reason.clone(),
        }
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
