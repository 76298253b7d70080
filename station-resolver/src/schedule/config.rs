//! Schedule query configuration.

use chrono::Duration;

/// Configuration parameters for schedule aggregation.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// How far in the past a visit may be and still be shown (seconds).
    pub past_tolerance_secs: i64,

    /// How far in the future a visit may be and still be shown (seconds).
    /// Later visits are usually bogus night-time data.
    pub horizon_secs: i64,
}

impl ScheduleConfig {
    pub fn new(past_tolerance_secs: i64, horizon_secs: i64) -> Self {
        Self {
            past_tolerance_secs,
            horizon_secs,
        }
    }

    /// Returns the past tolerance as a Duration.
    pub fn past_tolerance(&self) -> Duration {
        Duration::seconds(self.past_tolerance_secs)
    }

    /// Returns the horizon as a Duration.
    pub fn horizon(&self) -> Duration {
        Duration::seconds(self.horizon_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            past_tolerance_secs: 60,
            horizon_secs: 5 * 60 * 60,
        }
    }
}
