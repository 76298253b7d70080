//! CTS SIRI 2.0 client.
//!
//! This module provides an HTTP client for the Strasbourg CTS open data
//! API, which speaks SIRI 2.0 over JSON.
//!
//! Two endpoints are consumed:
//! - `stoppoints-discovery` lists every stop of the network with its
//!   logical stop code and position. It feeds the catalog rebuild.
//! - `stop-monitoring` returns the upcoming vehicle visits for one stop
//!   code. Exactly one `StopMonitoringDelivery` is expected per response;
//!   anything else is a contract violation.

mod client;
mod convert;
mod error;
pub mod mock;
mod types;

pub use client::{CtsClient, CtsConfig};
pub use convert::{convert_stop_monitoring, convert_stop_points};
pub use error::CtsError;
pub use mock::MockCtsClient;
pub use types::{
    AnnotatedStopPointRef, MonitoredCall, MonitoredStopVisit, MonitoredVehicleJourney,
    StopMonitoringDelivery, StopMonitoringResponse, StopPointsDiscoveryResponse,
};
