//! The station hierarchy.
//!
//! ```text
//! NamedStation        every stop sharing one normalized name
//! └─ ExtendedStation  stops presumed to be at the same place
//!    └─ LogicalStation  stops sharing one stop code
//! ```
//!
//! Extended stations are append-only and addressed by their position in
//! the named station, so a position is stable for the lifetime of a
//! catalog.

use serde::{Deserialize, Serialize};

use crate::domain::{Location, StopCode};

/// Arena index of a named station within its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedStationId(pub u32);

impl NamedStationId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// All stops sharing one stop code, reduced to a running average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalStation {
    pub stop_code: StopCode,
    /// Running average of every contributed location.
    pub location: Location,
    /// Number of stops averaged into `location`.
    pub contributions: u32,
    /// Largest distance (meters) seen between a new contribution and the
    /// average it was folded into.
    pub max_deviation_m: f64,
    /// `"{street} {postal_code} {city}"`, set when the name is ambiguous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl LogicalStation {
    pub fn new(stop_code: StopCode, location: Location) -> Self {
        Self {
            stop_code,
            location,
            contributions: 1,
            max_deviation_m: 0.0,
            address: None,
        }
    }

    /// Fold another stop with the same code into the running average.
    pub fn absorb(&mut self, location: Location) {
        let deviation = self.location.distance_to(&location);
        if deviation > self.max_deviation_m {
            self.max_deviation_m = deviation;
        }

        let n = f64::from(self.contributions);
        self.location = Location::new(
            (self.location.latitude * n + location.latitude) / (n + 1.0),
            (self.location.longitude * n + location.longitude) / (n + 1.0),
        );
        self.contributions += 1;
    }
}

/// Logical stations presumed to be the same physical place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedStation {
    pub logical_stations: Vec<LogicalStation>,
    /// Short location text distinguishing this place from the other
    /// extended stations of the same name. Unset when the name is unique.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
}

impl ExtendedStation {
    pub fn new(first: LogicalStation) -> Self {
        Self {
            logical_stations: vec![first],
            descriptor: None,
        }
    }

    /// Unweighted mean of the member logical stations' locations.
    pub fn average_location(&self) -> Option<Location> {
        Location::centroid(self.logical_stations.iter().map(|l| &l.location))
    }

    pub fn stop_codes(&self) -> Vec<StopCode> {
        self.logical_stations
            .iter()
            .map(|l| l.stop_code.clone())
            .collect()
    }

    pub fn logical_mut(&mut self, code: &StopCode) -> Option<&mut LogicalStation> {
        self.logical_stations
            .iter_mut()
            .find(|l| &l.stop_code == code)
    }
}

/// Every extended station sharing one normalized name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedStation {
    pub id: NamedStationId,
    /// Normalized name, the catalog key.
    pub key: String,
    /// Display name of the first stop seen under this key.
    pub name: String,
    pub extended_stations: Vec<ExtendedStation>,
}

impl NamedStation {
    pub fn new(id: NamedStationId, key: String, name: String) -> Self {
        Self {
            id,
            key,
            name,
            extended_stations: Vec::new(),
        }
    }

    pub fn logical_station_count(&self) -> usize {
        self.extended_stations
            .iter()
            .map(|e| e.logical_stations.len())
            .sum()
    }

    /// Stop codes of every extended station, in hierarchy order.
    pub fn stop_codes(&self) -> Vec<StopCode> {
        self.extended_stations
            .iter()
            .flat_map(|e| e.stop_codes())
            .collect()
    }

    pub fn extended(&self, index: usize) -> Option<&ExtendedStation> {
        self.extended_stations.get(index)
    }
}
