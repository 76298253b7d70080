//! Deciding whether several stops' schedules read better as one block.
//!
//! Stops on either side of a road usually serve disjoint directions, and
//! showing them together gives one compact board. When two stops share a
//! direction, merging would list the same line and destination twice, so
//! every stop is shown on its own instead.

use std::collections::HashSet;

use crate::domain::{Direction, StopCode};

/// Directions observed at one stop.
#[derive(Debug, Clone, PartialEq)]
pub struct StopDirections {
    pub stop_code: StopCode,
    pub directions: Vec<Direction>,
}

/// A block of stops displayed together.
#[derive(Debug, Clone, PartialEq)]
pub struct StopGroup {
    pub stop_codes: Vec<StopCode>,
    pub directions: Vec<Direction>,
}

impl From<StopDirections> for StopGroup {
    fn from(stop: StopDirections) -> Self {
        Self {
            stop_codes: vec![stop.stop_code],
            directions: stop.directions,
        }
    }
}

/// Merge all stops into one group if no direction appears at two of them;
/// otherwise return one group per stop, in input order.
pub fn merge_visits_if_appropriate(stops: Vec<StopDirections>) -> Vec<StopGroup> {
    if stops.len() < 2 {
        return stops.into_iter().map(StopGroup::from).collect();
    }

    let mut seen = HashSet::new();
    for stop in &stops {
        for direction in &stop.directions {
            if !seen.insert(direction.key()) {
                return stops.into_iter().map(StopGroup::from).collect();
            }
        }
    }

    let mut merged = StopGroup {
        stop_codes: Vec::with_capacity(stops.len()),
        directions: Vec::new(),
    };
    for stop in stops {
        merged.stop_codes.push(stop.stop_code);
        merged.directions.extend(stop.directions);
    }

    vec![merged]
}
