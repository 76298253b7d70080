//! Live schedule aggregation.
//!
//! One query per stop code, issued concurrently. Each stop's visits are
//! filtered to a plausible time window and grouped into directions; the
//! stops are then merged when that loses no information, and the blocks
//! ordered richest first.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::cts::CtsError;
use crate::domain::{
    AggregatedStationSchedule, Direction, DirectionKey, LookupError, RawVisit, ScheduleReport,
    StopCode, StopFailure, Visit,
};

use super::config::ScheduleConfig;
use super::merge::{StopDirections, merge_visits_if_appropriate};

/// Source of live visits for one stop.
///
/// This abstraction allows aggregation to be tested with mock data.
pub trait VisitProvider: Send + Sync {
    fn fetch_visits(
        &self,
        stop_code: &StopCode,
    ) -> impl Future<Output = Result<Vec<RawVisit>, CtsError>> + Send;
}

/// Drop implausible visits and group the rest into directions.
///
/// A visit is kept when its stop time lies within
/// `[now - past_tolerance, now + horizon]`, both ends included. Directions
/// appear in the order their first visit does.
pub fn group_visits(raw: &[RawVisit], now: DateTime<Utc>, config: &ScheduleConfig) -> Vec<Direction> {
    let earliest = now - config.past_tolerance();
    let latest = now + config.horizon();

    let mut directions: Vec<Direction> = Vec::new();
    let mut index: HashMap<DirectionKey, usize> = HashMap::new();

    for visit in raw {
        let time = visit.stop_time();
        if time < earliest || time > latest {
            continue;
        }

        match index.get(&visit.key()) {
            Some(&i) => directions[i].visits.push(Visit::new(time)),
            None => {
                index.insert(visit.key(), directions.len());
                directions.push(Direction::from_raw(visit, Visit::new(time)));
            }
        }
    }

    directions
}

/// Fetches and assembles live schedules.
pub struct ScheduleAggregator<'a, P> {
    provider: &'a P,
    config: ScheduleConfig,
}

impl<'a, P: VisitProvider> ScheduleAggregator<'a, P> {
    pub fn new(provider: &'a P, config: ScheduleConfig) -> Self {
        Self { provider, config }
    }

    /// Fetch and group visits for every stop concurrently.
    ///
    /// Stops that fail or have nothing upcoming are returned as failures.
    /// A contract violation from the feed aborts the whole query.
    pub async fn fetch_raw_visits(
        &self,
        stop_codes: &[StopCode],
        now: DateTime<Utc>,
    ) -> Result<(Vec<StopDirections>, Vec<StopFailure>), LookupError> {
        let futures = stop_codes.iter().map(|code| async move {
            let result = self.provider.fetch_visits(code).await;
            (code, result)
        });

        let results = join_all(futures).await;

        let mut stops = Vec::with_capacity(results.len());
        let mut failures = Vec::new();

        for (code, result) in results {
            match result {
                Ok(raw) => {
                    let directions = group_visits(&raw, now, &self.config);
                    if directions.is_empty() {
                        debug!(stop_code = %code, raw = raw.len(), "No upcoming visits");
                        failures.push(StopFailure::new(code.clone(), "no upcoming visits"));
                    } else {
                        stops.push(StopDirections {
                            stop_code: code.clone(),
                            directions,
                        });
                    }
                }
                Err(e) if e.is_contract_violation() => {
                    warn!(stop_code = %code, error = %e, "Feed contract violation");
                    return Err(LookupError::Contract(e));
                }
                Err(e) => {
                    warn!(stop_code = %code, error = %e, "Failed to fetch visits");
                    failures.push(StopFailure::new(code.clone(), e.to_string()));
                }
            }
        }

        Ok((stops, failures))
    }

    /// Build the schedule report for a set of stops, as of now.
    pub async fn schedule(&self, stop_codes: &[StopCode]) -> Result<ScheduleReport, LookupError> {
        self.schedule_at(stop_codes, Utc::now()).await
    }

    /// Build the schedule report for a set of stops, as of `now`.
    pub async fn schedule_at(
        &self,
        stop_codes: &[StopCode],
        now: DateTime<Utc>,
    ) -> Result<ScheduleReport, LookupError> {
        let (stops, failed_stops) = self.fetch_raw_visits(stop_codes, now).await?;

        if stops.is_empty() {
            let reason = if failed_stops.is_empty() {
                "no stops requested".to_string()
            } else {
                failed_stops
                    .iter()
                    .map(|f| format!("{}: {}", f.stop_code, f.reason))
                    .collect::<Vec<_>>()
                    .join("; ")
            };
            return Err(LookupError::ScheduleUnavailable {
                stop_codes: stop_codes.to_vec(),
                reason,
            });
        }

        let mut stations: Vec<AggregatedStationSchedule> = merge_visits_if_appropriate(stops)
            .into_iter()
            .map(|group| AggregatedStationSchedule::new(group.stop_codes, group.directions))
            .collect();

        stations.sort_by(|a, b| b.direction_count().cmp(&a.direction_count()));

        debug!(
            stops = stop_codes.len(),
            blocks = stations.len(),
            failed = failed_stops.len(),
            "Schedule assembled"
        );

        Ok(ScheduleReport {
            stations,
            failed_stops,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cts::MockCtsClient;
    use crate::domain::VehicleMode;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    fn code(s: &str) -> StopCode {
        StopCode::parse(s).unwrap()
    }

    fn visit(line: &str, destination: &str, mode: VehicleMode, offset: Duration) -> RawVisit {
        RawVisit {
            line: line.into(),
            destination: destination.into(),
            via: None,
            mode,
            direction_tag: 0,
            expected_departure: Some(now() + offset),
            expected_arrival: now() + offset,
        }
    }

    fn tram(line: &str, destination: &str, mins: i64) -> RawVisit {
        visit(line, destination, VehicleMode::Tram, Duration::minutes(mins))
    }

    #[test]
    fn staleness_bounds_are_inclusive() {
        let config = ScheduleConfig::default();
        let at = |offset: Duration| visit("A", "Illkirch", VehicleMode::Tram, offset);

        let raw = vec![
            at(Duration::seconds(-61)),
            at(Duration::seconds(-60)),
            at(Duration::minutes(4 * 60 + 59)),
            at(Duration::hours(5)),
            at(Duration::minutes(5 * 60 + 1)),
        ];

        let directions = group_visits(&raw, now(), &config);
        assert_eq!(directions.len(), 1);
        let times: Vec<_> = directions[0].visits.iter().map(|v| v.time).collect();
        assert_eq!(
            times,
            vec![
                now() - Duration::seconds(60),
                now() + Duration::minutes(4 * 60 + 59),
                now() + Duration::hours(5),
            ]
        );
    }

    #[test]
    fn groups_by_line_destination_mode_and_via() {
        let mut via = tram("C", "Neuhof", 6);
        via.via = Some("Gare Centrale".into());
        let bus = visit("C", "Neuhof", VehicleMode::Bus, Duration::minutes(7));

        let raw = vec![
            tram("C", "Neuhof", 2),
            tram("C", "Gare Centrale", 3),
            tram("C", "Neuhof", 12),
            via,
            bus,
        ];

        let directions = group_visits(&raw, now(), &ScheduleConfig::default());
        assert_eq!(directions.len(), 4);
        assert_eq!(directions[0].destination, "Neuhof");
        assert_eq!(directions[0].visits.len(), 2);
        assert_eq!(directions[1].destination, "Gare Centrale");
        assert_eq!(directions[2].via.as_deref(), Some("Gare Centrale"));
        assert_eq!(directions[3].mode, VehicleMode::Bus);
    }

    #[tokio::test]
    async fn disjoint_stops_are_merged() {
        let mock = MockCtsClient::new()
            .with_visits(code("185C"), vec![tram("C", "Neuhof", 2), tram("F", "Elsau", 4)])
            .with_visits(code("185A"), vec![tram("C", "Gare Centrale", 3)]);

        let report = ScheduleAggregator::new(&mock, ScheduleConfig::default())
            .schedule_at(&[code("185C"), code("185A")], now())
            .await
            .unwrap();

        assert_eq!(report.stations.len(), 1);
        let station = &report.stations[0];
        assert!(station.is_merged);
        assert_eq!(station.direction_count(), 3);
        assert_eq!(station.tram_lanes.len(), 2);
        assert!(report.failed_stops.is_empty());
        assert_eq!(mock.visit_calls(), 2);
    }

    #[tokio::test]
    async fn overlapping_stops_stay_separate_richest_first() {
        let mock = MockCtsClient::new()
            .with_visits(code("185C"), vec![tram("C", "Neuhof", 2)])
            .with_visits(
                code("185A"),
                vec![tram("C", "Neuhof", 5), tram("F", "Elsau", 4)],
            );

        let report = ScheduleAggregator::new(&mock, ScheduleConfig::default())
            .schedule_at(&[code("185C"), code("185A")], now())
            .await
            .unwrap();

        assert_eq!(report.stations.len(), 2);
        assert_eq!(report.stations[0].stop_codes, vec![code("185A")]);
        assert_eq!(report.stations[0].direction_count(), 2);
        assert!(!report.stations[1].is_merged);
    }

    #[tokio::test]
    async fn failed_stop_is_reported_not_fatal() {
        let mock = MockCtsClient::new()
            .with_visits(code("185C"), vec![tram("C", "Neuhof", 2)])
            .with_failure(code("185A"), 500, "upstream error");

        let report = ScheduleAggregator::new(&mock, ScheduleConfig::default())
            .schedule_at(&[code("185C"), code("185A")], now())
            .await
            .unwrap();

        assert_eq!(report.stations.len(), 1);
        assert!(report.is_partial());
        assert_eq!(report.failed_stops[0].stop_code, code("185A"));
        assert!(report.failed_stops[0].reason.contains("500"));
    }

    #[tokio::test]
    async fn stop_with_only_stale_visits_counts_as_failed() {
        let mock = MockCtsClient::new()
            .with_visits(code("185C"), vec![tram("C", "Neuhof", 2)])
            .with_visits(code("185A"), vec![tram("F", "Elsau", -10)]);

        let report = ScheduleAggregator::new(&mock, ScheduleConfig::default())
            .schedule_at(&[code("185C"), code("185A")], now())
            .await
            .unwrap();

        assert_eq!(report.failed_stops.len(), 1);
        assert_eq!(report.failed_stops[0].reason, "no upcoming visits");
    }

    #[tokio::test]
    async fn nothing_usable_is_unavailable() {
        let mock = MockCtsClient::new().with_failure(code("185A"), 503, "down");

        let err = ScheduleAggregator::new(&mock, ScheduleConfig::default())
            .schedule_at(&[code("185C"), code("185A")], now())
            .await
            .unwrap_err();

        match err {
            LookupError::ScheduleUnavailable { stop_codes, reason } => {
                assert_eq!(stop_codes.len(), 2);
                assert!(reason.contains("185C: no upcoming visits"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn contract_violation_aborts_query() {
        let mock = MockCtsClient::new()
            .with_visits(code("185C"), vec![tram("C", "Neuhof", 2)])
            .with_delivery_count(code("185A"), 2);

        let err = ScheduleAggregator::new(&mock, ScheduleConfig::default())
            .schedule_at(&[code("185C"), code("185A")], now())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LookupError::Contract(CtsError::UnexpectedDeliveryCount(2))
        ));
    }
}
