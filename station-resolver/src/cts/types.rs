//! CTS SIRI response DTOs.
//!
//! These types map directly to the SIRI 2.0 JSON documents returned by the
//! CTS API. Only the fields the resolver consumes are declared; serde
//! ignores the rest. Optional fields use `Option` because the API omits
//! them rather than sending null.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// Response from `stoppoints-discovery`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopPointsDiscoveryResponse {
    pub stop_points_delivery: StopPointsDelivery,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopPointsDelivery {
    /// When this response was generated.
    pub response_timestamp: Option<DateTime<FixedOffset>>,

    /// Every stop of the network.
    #[serde(default)]
    pub annotated_stop_point_ref: Vec<AnnotatedStopPointRef>,
}

/// One physical stop.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnnotatedStopPointRef {
    /// Physical stop identifier (one per side of the road).
    pub stop_point_ref: Option<String>,

    /// Display name, shared by all stops of a station.
    pub stop_name: String,

    pub location: SiriLocation,

    pub extension: StopPointExtension,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SiriLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// CTS-specific stop attributes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopPointExtension {
    /// Code shared by the stops of one logical station. This is the code
    /// accepted by `stop-monitoring` as `MonitoringRef`.
    pub logical_stop_code: String,
}

/// Response from `stop-monitoring`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopMonitoringResponse {
    pub service_delivery: ServiceDelivery,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceDelivery {
    pub response_timestamp: Option<DateTime<FixedOffset>>,

    /// Expected to hold exactly one element.
    #[serde(default)]
    pub stop_monitoring_delivery: Vec<StopMonitoringDelivery>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopMonitoringDelivery {
    #[serde(default)]
    pub monitored_stop_visit: Vec<MonitoredStopVisit>,
}

/// One vehicle visit at the monitored stop.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonitoredStopVisit {
    pub monitored_vehicle_journey: MonitoredVehicleJourney,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonitoredVehicleJourney {
    pub line_ref: Option<String>,

    /// Direction tag of the journey (0 or 1 in practice).
    #[serde(default)]
    pub direction_ref: i32,

    /// `"tram"`, `"bus"` or `"undefined"`.
    pub vehicle_mode: Option<String>,

    /// Line name shown to passengers (e.g. `"C"`, `"L1"`).
    pub published_line_name: String,

    pub destination_name: String,

    pub destination_short_name: Option<String>,

    pub via: Option<String>,

    pub monitored_call: MonitoredCall,
}

/// Timing of the visit at the monitored stop.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonitoredCall {
    pub stop_point_name: Option<String>,

    pub expected_departure_time: Option<DateTime<FixedOffset>>,

    pub expected_arrival_time: DateTime<FixedOffset>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_stop_points_discovery() {
        let json = r#"{
            "StopPointsDelivery": {
                "ResponseTimestamp": "2024-03-15T10:00:00+01:00",
                "AnnotatedStopPointRef": [
                    {
                        "StopPointRef": "SPR185C1",
                        "StopName": "Homme de Fer",
                        "Location": { "Longitude": 7.7450, "Latitude": 48.5839 },
                        "Extension": { "LogicalStopCode": "185C", "IsFlexibleStop": false }
                    }
                ]
            }
        }"#;

        let response: StopPointsDiscoveryResponse = serde_json::from_str(json).unwrap();
        let stops = &response.stop_points_delivery.annotated_stop_point_ref;
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].stop_name, "Homme de Fer");
        assert_eq!(stops[0].extension.logical_stop_code, "185C");
        assert!((stops[0].location.latitude - 48.5839).abs() < 1e-9);
    }

    #[test]
    fn parse_stop_monitoring() {
        let json = r#"{
            "ServiceDelivery": {
                "ResponseTimestamp": "2024-03-15T10:00:00+01:00",
                "StopMonitoringDelivery": [
                    {
                        "MonitoredStopVisit": [
                            {
                                "RecordedAtTime": "2024-03-15T10:00:00+01:00",
                                "MonitoredVehicleJourney": {
                                    "LineRef": "C",
                                    "DirectionRef": 1,
                                    "VehicleMode": "tram",
                                    "PublishedLineName": "C",
                                    "DestinationName": "Neuhof Rodolphe Reuss",
                                    "Via": "Gare Centrale",
                                    "MonitoredCall": {
                                        "StopPointName": "Homme de Fer",
                                        "ExpectedDepartureTime": "2024-03-15T10:04:30+01:00",
                                        "ExpectedArrivalTime": "2024-03-15T10:04:00+01:00"
                                    }
                                }
                            }
                        ]
                    }
                ]
            }
        }"#;

        let response: StopMonitoringResponse = serde_json::from_str(json).unwrap();
        let deliveries = &response.service_delivery.stop_monitoring_delivery;
        assert_eq!(deliveries.len(), 1);

        let journey = &deliveries[0].monitored_stop_visit[0].monitored_vehicle_journey;
        assert_eq!(journey.published_line_name, "C");
        assert_eq!(journey.direction_ref, 1);
        assert_eq!(journey.via.as_deref(), Some("Gare Centrale"));
        assert!(journey.monitored_call.expected_departure_time.is_some());
    }

    #[test]
    fn missing_delivery_list_defaults_to_empty() {
        let json = r#"{ "ServiceDelivery": {} }"#;
        let response: StopMonitoringResponse = serde_json::from_str(json).unwrap();
        assert!(response.service_delivery.stop_monitoring_delivery.is_empty());
    }
}
