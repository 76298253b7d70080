//! Catalog build configuration.

use std::fmt;
use std::str::FromStr;

/// Default distance under which two same-named stops are the same place.
const DEFAULT_PROXIMITY_THRESHOLD_M: f64 = 150.0;

/// Configuration for station clustering.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Maximum distance (meters) between a stop and the average location of
    /// an extended station for the stop to join it.
    pub proximity_threshold_m: f64,
}

impl ClusterConfig {
    /// Set the proximity threshold in meters.
    pub fn with_proximity_threshold(mut self, meters: f64) -> Self {
        self.proximity_threshold_m = meters;
        self
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_m: DEFAULT_PROXIMITY_THRESHOLD_M,
        }
    }
}

/// What to do when a reverse geocoding lookup fails during a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeocodeFailurePolicy {
    /// Abort the rebuild; the previous catalog stays published.
    #[default]
    Abort,
    /// Leave the affected address or descriptor unset and carry on.
    Degrade,
}

/// Error returned when parsing an unknown failure policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown geocode failure policy {0:?} (expected \"abort\" or \"degrade\")")]
pub struct InvalidFailurePolicy(String);

impl FromStr for GeocodeFailurePolicy {
    type Err = InvalidFailurePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(GeocodeFailurePolicy::Abort),
            "degrade" => Ok(GeocodeFailurePolicy::Degrade),
            _ => Err(InvalidFailurePolicy(s.to_string())),
        }
    }
}

impl fmt::Display for GeocodeFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeocodeFailurePolicy::Abort => f.write_str("abort"),
            GeocodeFailurePolicy::Degrade => f.write_str("degrade"),
        }
    }
}

/// Configuration for address annotation.
#[derive(Debug, Clone, Default)]
pub struct AnnotateConfig {
    pub failure_policy: GeocodeFailurePolicy,
}

impl AnnotateConfig {
    pub fn with_failure_policy(mut self, policy: GeocodeFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}
