//! Domain types for the station resolver.
//!
//! Raw stops and their identifiers, the name normalizer that keys the
//! catalog, and the per-query schedule model. Validated types enforce their
//! invariants at construction time.

mod error;
mod normalize;
mod schedule;
mod station;

pub use error::LookupError;
pub use normalize::normalize;
pub use schedule::{
    AggregatedStationSchedule, Direction, DirectionKey, Lane, RawVisit, ScheduleReport,
    StopFailure, VehicleMode, Visit, build_lanes,
};
pub use station::{InvalidStopCode, Location, Stop, StopCode};
