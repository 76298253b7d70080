//! Conversion from CTS DTOs to domain types.

use chrono::Utc;
use tracing::warn;

use crate::domain::{Location, RawVisit, Stop, StopCode, VehicleMode};

use super::error::CtsError;
use super::types::{MonitoredVehicleJourney, StopMonitoringResponse, StopPointsDiscoveryResponse};

/// Convert a stop discovery response to stops.
///
/// Entries with an invalid logical stop code or a non-finite position are
/// skipped rather than failing the whole feed.
pub fn convert_stop_points(response: &StopPointsDiscoveryResponse) -> Vec<Stop> {
    let refs = &response.stop_points_delivery.annotated_stop_point_ref;
    let mut stops = Vec::with_capacity(refs.len());

    for stop in refs {
        let code = match StopCode::parse(&stop.extension.logical_stop_code) {
            Ok(code) => code,
            Err(e) => {
                warn!(
                    stop_name = %stop.stop_name,
                    code = %stop.extension.logical_stop_code,
                    error = %e,
                    "Skipping stop with invalid code"
                );
                continue;
            }
        };

        let (lat, lon) = (stop.location.latitude, stop.location.longitude);
        if !lat.is_finite() || !lon.is_finite() {
            warn!(stop_code = %code, "Skipping stop with invalid location");
            continue;
        }

        stops.push(Stop::new(
            stop.stop_name.clone(),
            code,
            Location::new(lat, lon),
        ));
    }

    stops
}

/// Convert a stop monitoring response to raw visits.
///
/// Fails with [`CtsError::UnexpectedDeliveryCount`] unless the response
/// holds exactly one delivery.
pub fn convert_stop_monitoring(response: &StopMonitoringResponse) -> Result<Vec<RawVisit>, CtsError> {
    let deliveries = &response.service_delivery.stop_monitoring_delivery;

    let [delivery] = deliveries.as_slice() else {
        return Err(CtsError::UnexpectedDeliveryCount(deliveries.len()));
    };

    Ok(delivery
        .monitored_stop_visit
        .iter()
        .map(|visit| convert_journey(&visit.monitored_vehicle_journey))
        .collect())
}

fn convert_journey(journey: &MonitoredVehicleJourney) -> RawVisit {
    let call = &journey.monitored_call;

    RawVisit {
        line: journey.published_line_name.clone(),
        destination: journey.destination_name.clone(),
        via: journey.via.clone(),
        mode: journey
            .vehicle_mode
            .as_deref()
            .map(VehicleMode::from_siri)
            .unwrap_or(VehicleMode::Undefined),
        direction_tag: journey.direction_ref,
        expected_departure: call.expected_departure_time.map(|t| t.with_timezone(&Utc)),
        expected_arrival: call.expected_arrival_time.with_timezone(&Utc),
    }
}
