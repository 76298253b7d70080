//! `api-adresse.data.gouv.fr` reverse geocoding client.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::ReverseGeocoder;
use crate::domain::Location;

use super::error::GeocodeError;

/// Default base URL for the address API.
const DEFAULT_BASE_URL: &str = "https://api-adresse.data.gouv.fr";

/// A resolved postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub postal_code: String,
    pub city: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        postal_code: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            postal_code: postal_code.into(),
            city: city.into(),
        }
    }

    /// `"{street} {postal_code} {city}"`
    pub fn one_line(&self) -> String {
        format!("{} {} {}", self.street, self.postal_code, self.city)
    }

    /// `"{postal_code} {city}"`
    pub fn locality(&self) -> String {
        format!("{} {}", self.postal_code, self.city)
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Option<FeatureProperties>,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    name: Option<String>,
    postcode: Option<String>,
    city: Option<String>,
}

impl FeatureCollection {
    /// Address of the first feature, if it has every field.
    fn first_address(self) -> Option<Address> {
        let properties = self.features.into_iter().next()?.properties?;
        Some(Address {
            street: properties.name?,
            postal_code: properties.postcode?,
            city: properties.city?,
        })
    }
}

/// Configuration for the geocoding client.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 8,
        }
    }
}

impl GeocodeConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Client for the reverse geocoding endpoint.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeocodeClient {
    /// Create a new geocoding client.
    pub fn new(config: GeocodeConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve the address nearest to `location`.
    pub async fn reverse_geocode(&self, location: Location) -> Result<Address, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("lat", location.latitude), ("lon", location.longitude)])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let collection: FeatureCollection =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
                message: e.to_string(),
            })?;

        let address = collection
            .first_address()
            .ok_or(GeocodeError::MissingAddress { location })?;

        debug!(
            lat = location.latitude,
            lon = location.longitude,
            address = %address.one_line(),
            "Reverse geocoded"
        );

        Ok(address)
    }
}

impl ReverseGeocoder for GeocodeClient {
    async fn reverse(&self, location: Location) -> Result<Address, GeocodeError> {
        self.reverse_geocode(location).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = GeocodeConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 8);
    }

    #[test]
    fn address_formatting() {
        let address = Address::new("Rue du Maréchal Foch", "67000", "Strasbourg");
        assert_eq!(address.one_line(), "Rue du Maréchal Foch 67000 Strasbourg");
        assert_eq!(address.locality(), "67000 Strasbourg");
    }

    #[test]
    fn first_feature_is_used() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                { "properties": { "name": "Place Kléber", "postcode": "67000", "city": "Strasbourg", "score": 0.99 } },
                { "properties": { "name": "Rue des Grandes Arcades", "postcode": "67000", "city": "Strasbourg" } }
            ]
        }"#;

        let collection: FeatureCollection = serde_json::from_str(json).unwrap();
        let address = collection.first_address().unwrap();
        assert_eq!(address, Address::new("Place Kléber", "67000", "Strasbourg"));
    }

    #[test]
    fn incomplete_feature_has_no_address() {
        let json = r#"{ "features": [ { "properties": { "name": "Somewhere", "city": "Strasbourg" } } ] }"#;
        let collection: FeatureCollection = serde_json::from_str(json).unwrap();
        assert!(collection.first_address().is_none());

        let empty: FeatureCollection = serde_json::from_str(r#"{ "features": [] }"#).unwrap();
        assert!(empty.first_address().is_none());
    }
}
