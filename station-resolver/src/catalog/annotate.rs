//! Address annotation for ambiguous station names.
//!
//! A name shared by several stops gets a street address on every logical
//! station. A name shared by several places gets a short descriptor on
//! every extended station: the postal code and city when those alone tell
//! the places apart, the street as well otherwise.

use std::collections::HashSet;
use std::future::Future;

use tracing::{debug, warn};

use crate::domain::Location;
use crate::geocode::{Address, GeocodeError};

use super::config::{AnnotateConfig, GeocodeFailurePolicy};
use super::hierarchy::NamedStation;

/// Resolves a position to a postal address.
///
/// This abstraction allows annotation to be tested without network access.
pub trait ReverseGeocoder: Send + Sync {
    fn reverse(
        &self,
        location: Location,
    ) -> impl Future<Output = Result<Address, GeocodeError>> + Send;
}

/// Outcome of one annotation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationReport {
    /// Successful lookups.
    pub geocoded: usize,
    /// Lookups that failed and were skipped under the degrade policy.
    pub failures: usize,
}

/// Annotates named stations with addresses and descriptors.
pub struct AddressAnnotator<'a, G> {
    geocoder: &'a G,
    config: AnnotateConfig,
}

impl<'a, G: ReverseGeocoder> AddressAnnotator<'a, G> {
    pub fn new(geocoder: &'a G, config: AnnotateConfig) -> Self {
        Self { geocoder, config }
    }

    /// Annotate every ambiguous station in place.
    ///
    /// Lookups run one at a time to stay polite with the public address
    /// API. Under [`GeocodeFailurePolicy::Abort`] the first failure is
    /// returned and the stations are left partially annotated.
    pub async fn annotate(
        &self,
        stations: &mut [NamedStation],
    ) -> Result<AnnotationReport, GeocodeError> {
        let mut report = AnnotationReport::default();

        for named in stations.iter_mut() {
            if named.logical_station_count() > 1 {
                for extended in &mut named.extended_stations {
                    for logical in &mut extended.logical_stations {
                        logical.address = self
                            .lookup(logical.location, &mut report)
                            .await?
                            .map(|a| a.one_line());
                    }
                }
            }

            if named.extended_stations.len() > 1 {
                let mut addresses = Vec::with_capacity(named.extended_stations.len());
                for extended in &named.extended_stations {
                    let address = match extended.average_location() {
                        Some(location) => self.lookup(location, &mut report).await?,
                        None => None,
                    };
                    addresses.push(address);
                }

                let descriptors = disambiguate(&addresses);
                for (extended, descriptor) in named.extended_stations.iter_mut().zip(descriptors) {
                    extended.descriptor = descriptor;
                }

                debug!(
                    name = %named.name,
                    places = named.extended_stations.len(),
                    "Disambiguated station name"
                );
            }
        }

        Ok(report)
    }

    /// Geocode one position, applying the failure policy.
    async fn lookup(
        &self,
        location: Location,
        report: &mut AnnotationReport,
    ) -> Result<Option<Address>, GeocodeError> {
        match self.geocoder.reverse(location).await {
            Ok(address) => {
                report.geocoded += 1;
                Ok(Some(address))
            }
            Err(e) => match self.config.failure_policy {
                GeocodeFailurePolicy::Abort => Err(e),
                GeocodeFailurePolicy::Degrade => {
                    warn!(
                        lat = location.latitude,
                        lon = location.longitude,
                        error = %e,
                        "Reverse geocoding failed, leaving address unset"
                    );
                    report.failures += 1;
                    Ok(None)
                }
            },
        }
    }
}

/// Shortest descriptors telling a set of places apart.
///
/// `"{postal_code} {city}"` when no two known addresses share it,
/// `"{street}, {postal_code} {city}"` for every place otherwise. Places
/// without an address get no descriptor.
pub fn disambiguate(addresses: &[Option<Address>]) -> Vec<Option<String>> {
    let mut seen = HashSet::new();
    let must_use_street = addresses
        .iter()
        .flatten()
        .any(|a| !seen.insert(a.locality()));

    addresses
        .iter()
        .map(|address| {
            address.as_ref().map(|a| {
                if must_use_street {
                    format!("{}, {}", a.street, a.locality())
                } else {
                    a.locality()
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::cluster::StationClusterer;
    use crate::catalog::config::ClusterConfig;
    use crate::domain::{Stop, StopCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers by longitude band: west of 7.8 is Strasbourg, east is Kehl.
    struct BandGeocoder {
        calls: AtomicUsize,
        fail: bool,
        same_city: bool,
    }

    impl BandGeocoder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                same_city: false,
            }
        }
    }

    impl ReverseGeocoder for BandGeocoder {
        async fn reverse(&self, location: Location) -> Result<Address, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GeocodeError::MissingAddress { location });
            }
            let street = format!("Rue {:.3}", location.longitude);
            if self.same_city || location.longitude < 7.8 {
                Ok(Address::new(street, "67000", "Strasbourg"))
            } else {
                Ok(Address::new(street, "77694", "Kehl"))
            }
        }
    }

    fn stop(name: &str, code: &str, lat: f64, lon: f64) -> Stop {
        Stop::new(name, StopCode::parse(code).unwrap(), Location::new(lat, lon))
    }

    fn stations(stops: &[Stop]) -> Vec<NamedStation> {
        let mut clusterer = StationClusterer::new(ClusterConfig::default());
        for s in stops {
            clusterer.add_stop(s);
        }
        clusterer.stations().to_vec()
    }

    #[test]
    fn locality_is_enough_when_unique() {
        let descriptors = disambiguate(&[
            Some(Address::new("Rue A", "67000", "Strasbourg")),
            Some(Address::new("Rue B", "67400", "Illkirch")),
        ]);
        assert_eq!(
            descriptors,
            vec![Some("67000 Strasbourg".into()), Some("67400 Illkirch".into())]
        );
    }

    #[test]
    fn street_added_everywhere_on_collision() {
        let descriptors = disambiguate(&[
            Some(Address::new("Rue A", "67000", "Strasbourg")),
            Some(Address::new("Rue B", "67000", "Strasbourg")),
            Some(Address::new("Rue C", "67400", "Illkirch")),
        ]);
        assert_eq!(
            descriptors,
            vec![
                Some("Rue A, 67000 Strasbourg".into()),
                Some("Rue B, 67000 Strasbourg".into()),
                Some("Rue C, 67400 Illkirch".into()),
            ]
        );
    }

    #[test]
    fn missing_addresses_get_no_descriptor() {
        let descriptors = disambiguate(&[None, Some(Address::new("Rue A", "67000", "Strasbourg"))]);
        assert_eq!(descriptors, vec![None, Some("67000 Strasbourg".into())]);
    }

    #[tokio::test]
    async fn unique_single_stop_is_not_geocoded() {
        let geocoder = BandGeocoder::new();
        let mut named = stations(&[stop("Esplanade", "438E", 48.58, 7.75)]);

        let report = AddressAnnotator::new(&geocoder, AnnotateConfig::default())
            .annotate(&mut named)
            .await
            .unwrap();

        assert_eq!(report, AnnotationReport::default());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
        assert!(named[0].extended_stations[0].logical_stations[0].address.is_none());
        assert!(named[0].extended_stations[0].descriptor.is_none());
    }

    #[tokio::test]
    async fn two_stops_one_place_get_addresses_only() {
        let geocoder = BandGeocoder::new();
        let mut named = stations(&[
            stop("Esplanade", "438E", 48.5800, 7.7500),
            stop("Esplanade", "438F", 48.5805, 7.7505),
        ]);

        AddressAnnotator::new(&geocoder, AnnotateConfig::default())
            .annotate(&mut named)
            .await
            .unwrap();

        let extended = &named[0].extended_stations[0];
        assert_eq!(
            extended.logical_stations[0].address.as_deref(),
            Some("Rue 7.750 67000 Strasbourg")
        );
        assert!(extended.logical_stations[1].address.is_some());
        assert!(extended.descriptor.is_none());
    }

    #[tokio::test]
    async fn distinct_places_get_descriptors() {
        let geocoder = BandGeocoder::new();
        let mut named = stations(&[
            stop("Rhin", "1A", 48.5700, 7.7600),
            stop("Rhin", "2A", 48.5700, 7.8200),
        ]);

        let report = AddressAnnotator::new(&geocoder, AnnotateConfig::default())
            .annotate(&mut named)
            .await
            .unwrap();

        // Two logical stations plus two extended averages
        assert_eq!(report.geocoded, 4);
        assert_eq!(
            named[0].extended_stations[0].descriptor.as_deref(),
            Some("67000 Strasbourg")
        );
        assert_eq!(
            named[0].extended_stations[1].descriptor.as_deref(),
            Some("77694 Kehl")
        );
    }

    #[tokio::test]
    async fn same_city_places_include_street() {
        let geocoder = BandGeocoder {
            same_city: true,
            ..BandGeocoder::new()
        };
        let mut named = stations(&[
            stop("Rhin", "1A", 48.5700, 7.7600),
            stop("Rhin", "2A", 48.5700, 7.8200),
        ]);

        AddressAnnotator::new(&geocoder, AnnotateConfig::default())
            .annotate(&mut named)
            .await
            .unwrap();

        assert_eq!(
            named[0].extended_stations[1].descriptor.as_deref(),
            Some("Rue 7.820, 67000 Strasbourg")
        );
    }

    #[tokio::test]
    async fn abort_policy_returns_first_failure() {
        let geocoder = BandGeocoder {
            fail: true,
            ..BandGeocoder::new()
        };
        let mut named = stations(&[
            stop("Esplanade", "438E", 48.5800, 7.7500),
            stop("Esplanade", "438F", 48.5805, 7.7505),
        ]);

        let result = AddressAnnotator::new(&geocoder, AnnotateConfig::default())
            .annotate(&mut named)
            .await;

        assert!(matches!(result, Err(GeocodeError::MissingAddress { .. })));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn degrade_policy_keeps_going() {
        let geocoder = BandGeocoder {
            fail: true,
            ..BandGeocoder::new()
        };
        let mut named = stations(&[
            stop("Rhin", "1A", 48.5700, 7.7600),
            stop("Rhin", "2A", 48.5700, 7.8200),
        ]);

        let config = AnnotateConfig::default().with_failure_policy(GeocodeFailurePolicy::Degrade);
        let report = AddressAnnotator::new(&geocoder, config)
            .annotate(&mut named)
            .await
            .unwrap();

        assert_eq!(report.failures, 4);
        assert_eq!(report.geocoded, 0);
        assert!(named[0].extended_stations.iter().all(|e| e.descriptor.is_none()));
    }
}
