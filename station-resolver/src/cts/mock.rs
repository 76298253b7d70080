//! Mock CTS client for testing without API access.
//!
//! Serves stops and visits from memory. Failures can be injected per stop
//! code, and the stop feed can be switched off to exercise the snapshot
//! fallback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::catalog::StopFeed;
use crate::domain::{RawVisit, Stop, StopCode};
use crate::schedule::VisitProvider;

use super::error::CtsError;

/// Canned response for one stop code.
#[derive(Debug, Clone)]
enum MockResponse {
    Visits(Vec<RawVisit>),
    Failure { status: u16, message: String },
    DeliveryCount(usize),
}

#[derive(Debug, Default)]
struct MockState {
    stops: Vec<Stop>,
    responses: HashMap<StopCode, MockResponse>,
    feed_unavailable: bool,
}

/// In-memory CTS client.
///
/// Clones share state, so a test can keep a handle and change the data
/// served to a refresher or aggregator that owns another clone.
#[derive(Debug, Clone, Default)]
pub struct MockCtsClient {
    state: Arc<Mutex<MockState>>,
    visit_calls: Arc<AtomicUsize>,
}

impl MockCtsClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these stops from the stop feed.
    pub fn with_stops(self, stops: Vec<Stop>) -> Self {
        self.set_stops(stops);
        self
    }

    /// Serve these visits for `code`.
    pub fn with_visits(self, code: StopCode, visits: Vec<RawVisit>) -> Self {
        self.lock().responses.insert(code, MockResponse::Visits(visits));
        self
    }

    /// Answer requests for `code` with an API error.
    pub fn with_failure(self, code: StopCode, status: u16, message: impl Into<String>) -> Self {
        self.lock().responses.insert(
            code,
            MockResponse::Failure {
                status,
                message: message.into(),
            },
        );
        self
    }

    /// Answer requests for `code` with `count` deliveries instead of one.
    pub fn with_delivery_count(self, code: StopCode, count: usize) -> Self {
        self.lock()
            .responses
            .insert(code, MockResponse::DeliveryCount(count));
        self
    }

    /// Replace the stops served by the feed.
    pub fn set_stops(&self, stops: Vec<Stop>) {
        self.lock().stops = stops;
    }

    /// Make the stop feed fail with a 503 until switched back.
    pub fn set_feed_unavailable(&self, unavailable: bool) {
        self.lock().feed_unavailable = unavailable;
    }

    /// Number of visit requests served so far.
    pub fn visit_calls(&self) -> usize {
        self.visit_calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StopFeed for MockCtsClient {
    async fn fetch_stops(&self) -> Result<Vec<Stop>, CtsError> {
        let state = self.lock();
        if state.feed_unavailable {
            return Err(CtsError::Api {
                status: 503,
                message: "stop feed unavailable".to_string(),
            });
        }
        Ok(state.stops.clone())
    }
}

impl VisitProvider for MockCtsClient {
    async fn fetch_visits(&self, stop_code: &StopCode) -> Result<Vec<RawVisit>, CtsError> {
        self.visit_calls.fetch_add(1, Ordering::SeqCst);

        let response = self.lock().responses.get(stop_code).cloned();
        match response {
            Some(MockResponse::Visits(visits)) => Ok(visits),
            Some(MockResponse::Failure { status, message }) => {
                Err(CtsError::Api { status, message })
            }
            Some(MockResponse::DeliveryCount(n)) => Err(CtsError::UnexpectedDeliveryCount(n)),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, VehicleMode};
    use chrono::{TimeZone, Utc};

    fn code(s: &str) -> StopCode {
        StopCode::parse(s).unwrap()
    }

    fn visit() -> RawVisit {
        RawVisit {
            line: "A".into(),
            destination: "Parc des Sports".into(),
            via: None,
            mode: VehicleMode::Tram,
            direction_tag: 0,
            expected_departure: None,
            expected_arrival: Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn serves_configured_visits() {
        let client = MockCtsClient::new().with_visits(code("185C"), vec![visit()]);

        let visits = client.fetch_visits(&code("185C")).await.unwrap();
        assert_eq!(visits.len(), 1);
        assert!(client.fetch_visits(&code("999Z")).await.unwrap().is_empty());
        assert_eq!(client.visit_calls(), 2);
    }

    #[tokio::test]
    async fn injected_failures() {
        let client = MockCtsClient::new()
            .with_failure(code("185C"), 500, "boom")
            .with_delivery_count(code("185A"), 2);

        let err = client.fetch_visits(&code("185C")).await.unwrap_err();
        assert!(matches!(err, CtsError::Api { status: 500, .. }));

        let err = client.fetch_visits(&code("185A")).await.unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[tokio::test]
    async fn clones_share_stop_feed() {
        let client = MockCtsClient::new();
        let handle = client.clone();

        handle.set_stops(vec![Stop::new(
            "Esplanade",
            code("438E"),
            Location::new(48.578, 7.770),
        )]);
        assert_eq!(client.fetch_stops().await.unwrap().len(), 1);

        handle.set_feed_unavailable(true);
        assert!(client.fetch_stops().await.is_err());
    }
}
