//! Live schedule aggregation and merging.

mod aggregate;
mod config;
mod merge;

pub use aggregate::{ScheduleAggregator, VisitProvider, group_visits};
pub use config::ScheduleConfig;
pub use merge::{StopDirections, StopGroup, merge_visits_if_appropriate};
