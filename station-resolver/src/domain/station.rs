//! Stop identifiers, locations and raw stops.

use std::fmt;

use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};

/// Maximum length accepted for a stop code.
const MAX_STOP_CODE_LEN: usize = 32;

/// Error returned when parsing an invalid stop code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop code: {reason}")]
pub struct InvalidStopCode {
    reason: &'static str,
}

/// A logical stop code as published by the stop discovery feed (e.g. `185C`).
///
/// Stop codes are non-empty ASCII identifiers made of letters, digits,
/// `-` and `_`. This type guarantees validity by construction.
///
/// # Examples
///
/// ```
/// use station_resolver::domain::StopCode;
///
/// let code = StopCode::parse("185C").unwrap();
/// assert_eq!(code.as_str(), "185C");
///
/// assert!(StopCode::parse("").is_err());
/// assert!(StopCode::parse("185 C").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StopCode(String);

impl StopCode {
    /// Parse a stop code from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidStopCode> {
        if s.is_empty() {
            return Err(InvalidStopCode {
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_STOP_CODE_LEN {
            return Err(InvalidStopCode {
                reason: "too long",
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(InvalidStopCode {
                reason: "must be ASCII letters, digits, '-' or '_'",
            });
        }

        Ok(StopCode(s.to_string()))
    }

    /// Returns the stop code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StopCode {
    type Error = InvalidStopCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StopCode> for String {
    fn from(value: StopCode) -> Self {
        value.0
    }
}

impl fmt::Debug for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopCode({})", self.0)
    }
}

impl fmt::Display for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another location, in meters.
    pub fn distance_to(&self, other: &Location) -> f64 {
        self.to_point().haversine_distance(&other.to_point())
    }

    /// Unweighted mean of a set of locations.
    ///
    /// Returns `None` for an empty set.
    pub fn centroid<'a>(locations: impl IntoIterator<Item = &'a Location>) -> Option<Location> {
        let (count, lat, lon) = locations
            .into_iter()
            .fold((0usize, 0.0, 0.0), |(n, lat, lon), l| {
                (n + 1, lat + l.latitude, lon + l.longitude)
            });

        if count == 0 {
            return None;
        }

        let n = count as f64;
        Some(Location::new(lat / n, lon / n))
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// A physical point where a vehicle halts in one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Display name as published by the feed.
    pub name: String,
    /// Logical stop code shared by the stops of one logical station.
    pub code: StopCode,
    pub location: Location,
}

impl Stop {
    pub fn new(name: impl Into<String>, code: StopCode, location: Location) -> Self {
        Self {
            name: name.into(),
            code,
            location,
        }
    }
}
