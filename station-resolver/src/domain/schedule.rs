//! Live schedule types.
//!
//! These are built per schedule query from raw visit records and thrown
//! away once the response is produced. Ordering rules:
//! - lanes by name ascending
//! - directions by direction tag descending, then line name ascending (stable)
//! - visits by time ascending

use chrono::{DateTime, Utc};

use super::StopCode;

/// Kind of vehicle serving a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleMode {
    Tram,
    Bus,
    Undefined,
}

impl VehicleMode {
    /// Parse the SIRI `VehicleMode` field. Unknown values map to `Undefined`.
    pub fn from_siri(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "tram" => VehicleMode::Tram,
            "bus" => VehicleMode::Bus,
            _ => VehicleMode::Undefined,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleMode::Tram => "tram",
            VehicleMode::Bus => "bus",
            VehicleMode::Undefined => "undefined",
        }
    }
}

/// Grouping key for visits: two visits with the same key belong to the
/// same [`Direction`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectionKey {
    pub line: String,
    pub destination: String,
    pub mode: VehicleMode,
    pub via: Option<String>,
}

/// One visit record as delivered by the live-visit feed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVisit {
    pub line: String,
    pub destination: String,
    pub via: Option<String>,
    pub mode: VehicleMode,
    pub direction_tag: i32,
    pub expected_departure: Option<DateTime<Utc>>,
    pub expected_arrival: DateTime<Utc>,
}

impl RawVisit {
    /// The instant the vehicle is at the stop: departure, or arrival when
    /// the feed omits the departure.
    pub fn stop_time(&self) -> DateTime<Utc> {
        self.expected_departure.unwrap_or(self.expected_arrival)
    }

    pub fn key(&self) -> DirectionKey {
        DirectionKey {
            line: self.line.clone(),
            destination: self.destination.clone(),
            mode: self.mode,
            via: self.via.clone(),
        }
    }
}

/// An upcoming departure or arrival instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Visit {
    pub time: DateTime<Utc>,
}

impl Visit {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }

    /// Whole minutes from `now` until this visit, rounded to the nearest
    /// minute and never negative.
    pub fn minutes_until(&self, now: DateTime<Utc>) -> i64 {
        let millis = (self.time - now).num_milliseconds();
        ((millis as f64) / 60_000.0).round().max(0.0) as i64
    }
}

/// A line + destination (+ via) combination with its upcoming visits.
#[derive(Debug, Clone, PartialEq)]
pub struct Direction {
    pub line: String,
    pub destination: String,
    pub via: Option<String>,
    pub mode: VehicleMode,
    pub direction_tag: i32,
    pub visits: Vec<Visit>,
}

impl Direction {
    /// Start a direction from its first visit record.
    pub fn from_raw(raw: &RawVisit, first: Visit) -> Self {
        Self {
            line: raw.line.clone(),
            destination: raw.destination.clone(),
            via: raw.via.clone(),
            mode: raw.mode,
            direction_tag: raw.direction_tag,
            visits: vec![first],
        }
    }

    pub fn key(&self) -> DirectionKey {
        DirectionKey {
            line: self.line.clone(),
            destination: self.destination.clone(),
            mode: self.mode,
            via: self.via.clone(),
        }
    }

    /// Human-readable summary, e.g. `"C: Neuhof via Rodolphe Reuss"`.
    pub fn description(&self) -> String {
        match &self.via {
            Some(via) => format!("{}: {} via {}", self.line, self.destination, via),
            None => format!("{}: {}", self.line, self.destination),
        }
    }
}

/// A transit line with its directions.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub name: String,
    pub directions: Vec<Direction>,
}

/// Group directions into lanes, applying the display ordering.
pub fn build_lanes(mut directions: Vec<Direction>) -> Vec<Lane> {
    for direction in &mut directions {
        direction.visits.sort();
    }

    // Two stable passes: tag descending first, so it survives as the
    // tie-break inside each line.
    directions.sort_by(|a, b| b.direction_tag.cmp(&a.direction_tag));
    directions.sort_by(|a, b| a.line.cmp(&b.line));

    let mut lanes: Vec<Lane> = Vec::new();
    for direction in directions {
        match lanes.last_mut() {
            Some(lane) if lane.name == direction.line => lane.directions.push(direction),
            _ => lanes.push(Lane {
                name: direction.line.clone(),
                directions: vec![direction],
            }),
        }
    }

    lanes
}

/// The schedule of one queried station: either a single stop or several
/// stops merged into one block.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedStationSchedule {
    /// Stop codes covered by this block.
    pub stop_codes: Vec<StopCode>,
    /// Whether several stops were merged into this block.
    pub is_merged: bool,
    pub tram_lanes: Vec<Lane>,
    /// Bus lanes, plus any lane whose mode the feed left undefined.
    pub bus_lanes: Vec<Lane>,
}

impl AggregatedStationSchedule {
    pub fn new(stop_codes: Vec<StopCode>, directions: Vec<Direction>) -> Self {
        let (trams, buses): (Vec<_>, Vec<_>) = directions
            .into_iter()
            .partition(|d| d.mode == VehicleMode::Tram);

        Self {
            is_merged: stop_codes.len() > 1,
            stop_codes,
            tram_lanes: build_lanes(trams),
            bus_lanes: build_lanes(buses),
        }
    }

    /// Number of directions across all lanes.
    pub fn direction_count(&self) -> usize {
        self.tram_lanes
            .iter()
            .chain(&self.bus_lanes)
            .map(|lane| lane.directions.len())
            .sum()
    }

}

/// A stop whose live data could not be used for this query.
#[derive(Debug, Clone, PartialEq)]
pub struct StopFailure {
    pub stop_code: StopCode,
    pub reason: String,
}

impl StopFailure {
    pub fn new(stop_code: StopCode, reason: impl Into<String>) -> Self {
        Self {
            stop_code,
            reason: reason.into(),
        }
    }
}

/// Result of one schedule query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleReport {
    /// Station blocks, richest first.
    pub stations: Vec<AggregatedStationSchedule>,
    /// Stops omitted from `stations` because their fetch failed or they
    /// had no upcoming visits.
    pub failed_stops: Vec<StopFailure>,
}

impl ScheduleReport {
    /// True when some requested stops are missing from the report.
    pub fn is_partial(&self) -> bool {
        !self.failed_stops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, h, m, 0).unwrap()
    }

    fn direction(line: &str, destination: &str, tag: i32, mode: VehicleMode) -> Direction {
        Direction {
            line: line.to_string(),
            destination: destination.to_string(),
            via: None,
            mode,
            direction_tag: tag,
            visits: vec![Visit::new(at(10, 5))],
        }
    }

    fn code(s: &str) -> StopCode {
        StopCode::parse(s).unwrap()
    }

    #[test]
    fn vehicle_mode_from_siri() {
        assert_eq!(VehicleMode::from_siri("tram"), VehicleMode::Tram);
        assert_eq!(VehicleMode::from_siri("Bus"), VehicleMode::Bus);
        assert_eq!(VehicleMode::from_siri("ferry"), VehicleMode::Undefined);
    }

    #[test]
    fn stop_time_falls_back_to_arrival() {
        let mut raw = RawVisit {
            line: "A".into(),
            destination: "Parc des Sports".into(),
            via: None,
            mode: VehicleMode::Tram,
            direction_tag: 1,
            expected_departure: Some(at(10, 2)),
            expected_arrival: at(10, 1),
        };
        assert_eq!(raw.stop_time(), at(10, 2));

        raw.expected_departure = None;
        assert_eq!(raw.stop_time(), at(10, 1));
    }

    #[test]
    fn minutes_until_rounds_and_clamps() {
        let now = at(10, 0);
        assert_eq!(Visit::new(at(10, 5)).minutes_until(now), 5);
        assert_eq!(Visit::new(now + chrono::Duration::seconds(89)).minutes_until(now), 1);
        assert_eq!(Visit::new(now + chrono::Duration::seconds(91)).minutes_until(now), 2);
        assert_eq!(Visit::new(at(9, 59)).minutes_until(now), 0);
    }

    #[test]
    fn description_includes_via() {
        let mut d = direction("C", "Neuhof", 1, VehicleMode::Tram);
        assert_eq!(d.description(), "C: Neuhof");
        d.via = Some("Rodolphe Reuss".into());
        assert_eq!(d.description(), "C: Neuhof via Rodolphe Reuss");
    }

    #[test]
    fn lanes_sorted_by_name_with_tag_descending_inside() {
        let directions = vec![
            direction("E", "Robertsau", 0, VehicleMode::Tram),
            direction("C", "Gare Centrale", 0, VehicleMode::Tram),
            direction("C", "Neuhof", 1, VehicleMode::Tram),
            direction("E", "Campus d'Illkirch", 1, VehicleMode::Tram),
        ];

        let lanes = build_lanes(directions);
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes[0].name, "C");
        assert_eq!(lanes[0].directions[0].destination, "Neuhof");
        assert_eq!(lanes[0].directions[1].destination, "Gare Centrale");
        assert_eq!(lanes[1].name, "E");
        assert_eq!(lanes[1].directions[0].destination, "Campus d'Illkirch");
        assert_eq!(lanes[1].directions[1].destination, "Robertsau");
    }

    #[test]
    fn equal_tags_keep_insertion_order() {
        let directions = vec![
            direction("L1", "Lingolsheim", 1, VehicleMode::Bus),
            direction("L1", "Gare Centrale", 1, VehicleMode::Bus),
        ];
        let lanes = build_lanes(directions);
        assert_eq!(lanes[0].directions[0].destination, "Lingolsheim");
        assert_eq!(lanes[0].directions[1].destination, "Gare Centrale");
    }

    #[test]
    fn visits_sorted_ascending() {
        let mut d = direction("A", "Illkirch", 0, VehicleMode::Tram);
        d.visits = vec![Visit::new(at(10, 9)), Visit::new(at(10, 1)), Visit::new(at(10, 4))];
        let lanes = build_lanes(vec![d]);
        let times: Vec<_> = lanes[0].directions[0].visits.iter().map(|v| v.time).collect();
        assert_eq!(times, vec![at(10, 1), at(10, 4), at(10, 9)]);
    }

    #[test]
    fn aggregated_schedule_splits_modes() {
        let schedule = AggregatedStationSchedule::new(
            vec![code("185C"), code("185A")],
            vec![
                direction("C", "Neuhof", 1, VehicleMode::Tram),
                direction("L1", "Lingolsheim", 1, VehicleMode::Bus),
                direction("N2", "Illkirch", 0, VehicleMode::Undefined),
            ],
        );

        assert!(schedule.is_merged);
        assert_eq!(schedule.tram_lanes.len(), 1);
        assert_eq!(schedule.bus_lanes.len(), 2);
        assert_eq!(schedule.direction_count(), 3);
    }

    #[test]
    fn single_stop_is_not_merged() {
        let schedule = AggregatedStationSchedule::new(
            vec![code("438E")],
            vec![direction("C", "Neuhof", 1, VehicleMode::Tram)],
        );
        assert!(!schedule.is_merged);
        assert!(schedule.bus_lanes.is_empty());
    }
}
