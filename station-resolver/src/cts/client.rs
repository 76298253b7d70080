//! CTS SIRI HTTP client.
//!
//! Handles authentication, request concurrency and conversion to domain
//! types.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::catalog::StopFeed;
use crate::domain::{RawVisit, Stop, StopCode};
use crate::schedule::VisitProvider;

use super::convert::{convert_stop_monitoring, convert_stop_points};
use super::error::CtsError;
use super::types::{StopMonitoringResponse, StopPointsDiscoveryResponse};

/// Default base URL for the CTS SIRI 2.0 API.
const DEFAULT_BASE_URL: &str = "https://api.cts-strasbourg.eu/v1/siri/2.0";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// Configuration for the CTS client.
#[derive(Debug, Clone)]
pub struct CtsConfig {
    /// API token, sent as the Basic auth user name
    pub token: String,
    /// Base URL for the API (defaults to production CTS)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl CtsConfig {
    /// Create a new config with the given API token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// CTS API client.
///
/// Uses a semaphore to limit concurrent requests, since a single schedule
/// query fans out to every stop of a station.
#[derive(Debug, Clone)]
pub struct CtsClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl CtsClient {
    /// Create a new CTS client with the given configuration.
    pub fn new(config: CtsConfig) -> Result<Self, CtsError> {
        let mut headers = HeaderMap::new();

        // Token as user name, empty password
        let credentials = STANDARD.encode(format!("{}:", config.token));
        let auth = HeaderValue::from_str(&format!("Basic {credentials}")).map_err(|_| {
            CtsError::Api {
                status: 0,
                message: "Invalid API token format".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Fetch every stop of the network.
    pub async fn get_stops(&self) -> Result<Vec<Stop>, CtsError> {
        let response: StopPointsDiscoveryResponse =
            self.get_json("stoppoints-discovery", &[]).await?;

        let stops = convert_stop_points(&response);
        debug!(count = stops.len(), "Fetched stop points");
        Ok(stops)
    }

    /// Fetch upcoming visits at one logical stop.
    pub async fn get_visits(&self, stop_code: &StopCode) -> Result<Vec<RawVisit>, CtsError> {
        let response: StopMonitoringResponse = self
            .get_json("stop-monitoring", &[("MonitoringRef", stop_code.as_str())])
            .await?;

        let visits = convert_stop_monitoring(&response)?;
        debug!(stop_code = %stop_code, count = visits.len(), "Fetched stop visits");
        Ok(visits)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CtsError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| CtsError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CtsError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CtsError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CtsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| CtsError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl StopFeed for CtsClient {
    async fn fetch_stops(&self) -> Result<Vec<Stop>, CtsError> {
        self.get_stops().await
    }
}

impl VisitProvider for CtsClient {
    async fn fetch_visits(&self, stop_code: &StopCode) -> Result<Vec<RawVisit>, CtsError> {
        self.get_visits(stop_code).await
    }
}
