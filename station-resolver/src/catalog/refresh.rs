//! Catalog rebuild orchestration.
//!
//! A rebuild fetches the whole stop feed, clusters it, annotates ambiguous
//! names and freezes the result. Nothing published is touched until the
//! new catalog is complete; any failure leaves the current one in place.

use std::future::Future;

use chrono::Utc;
use tracing::{info, warn};

use crate::cts::CtsError;
use crate::domain::Stop;

use super::annotate::{AddressAnnotator, ReverseGeocoder};
use super::cluster::StationClusterer;
use super::config::{AnnotateConfig, ClusterConfig};
use super::error::IngestionError;
use super::registry::StationCatalog;
use super::snapshot::CatalogSnapshot;
use super::store::CatalogStore;

/// Source of the raw stop list.
///
/// This abstraction allows rebuilds to be tested with mock data.
pub trait StopFeed: Send + Sync {
    fn fetch_stops(&self) -> impl Future<Output = Result<Vec<Stop>, CtsError>> + Send;
}

/// Rebuilds, persists and publishes the catalog.
pub struct CatalogRefresher<F, G> {
    feed: F,
    geocoder: G,
    snapshot: CatalogSnapshot,
    cluster_config: ClusterConfig,
    annotate_config: AnnotateConfig,
    load_from_snapshot: bool,
}

impl<F: StopFeed, G: ReverseGeocoder> CatalogRefresher<F, G> {
    pub fn new(feed: F, geocoder: G, snapshot: CatalogSnapshot) -> Self {
        Self {
            feed,
            geocoder,
            snapshot,
            cluster_config: ClusterConfig::default(),
            annotate_config: AnnotateConfig::default(),
            load_from_snapshot: false,
        }
    }

    pub fn with_cluster_config(mut self, config: ClusterConfig) -> Self {
        self.cluster_config = config;
        self
    }

    pub fn with_annotate_config(mut self, config: AnnotateConfig) -> Self {
        self.annotate_config = config;
        self
    }

    /// Skip the feed at startup and go straight to the snapshot.
    pub fn with_load_from_snapshot(mut self, enabled: bool) -> Self {
        self.load_from_snapshot = enabled;
        self
    }

    /// Build a fresh catalog from the feed.
    pub async fn rebuild(&self) -> Result<StationCatalog, IngestionError> {
        let generated_at = Utc::now();
        let mut stops = self.feed.fetch_stops().await?;

        // Clustering is order-dependent
        stops.sort_by(|a, b| {
            a.code
                .cmp(&b.code)
                .then(a.location.latitude.total_cmp(&b.location.latitude))
                .then(a.location.longitude.total_cmp(&b.location.longitude))
        });

        let mut clusterer = StationClusterer::new(self.cluster_config.clone());
        for stop in &stops {
            clusterer.add_stop(stop);
        }

        let report = AddressAnnotator::new(&self.geocoder, self.annotate_config.clone())
            .annotate(clusterer.stations_mut())
            .await?;

        let catalog = clusterer.finish(generated_at);

        info!(
            stops = stops.len(),
            stations = catalog.len(),
            places = catalog.extended_station_count(),
            geocoded = report.geocoded,
            geocode_failures = report.failures,
            hash = %catalog.hash(),
            "Catalog rebuilt"
        );

        Ok(catalog)
    }

    /// Rebuild, persist and publish.
    ///
    /// On failure the store is left untouched and the error is returned.
    /// A snapshot write failure is logged but does not prevent publishing.
    pub async fn refresh(&self, store: &CatalogStore) -> Result<(), IngestionError> {
        let catalog = self.rebuild().await?;
        self.persist(&catalog);
        store.publish(catalog).await;
        Ok(())
    }

    /// Produce the first catalog at startup.
    ///
    /// Rebuilds from the feed unless configured to load from the snapshot,
    /// and falls back to the snapshot (with its original timestamp) when
    /// the rebuild fails. Errors only if no catalog can be produced.
    pub async fn load_initial(&self) -> Result<StationCatalog, IngestionError> {
        if self.load_from_snapshot {
            info!(path = %self.snapshot.path().display(), "Loading catalog from snapshot");
            return self.snapshot.load();
        }

        match self.rebuild().await {
            Ok(catalog) => {
                self.persist(&catalog);
                Ok(catalog)
            }
            Err(e) => {
                warn!(error = %e, "Catalog rebuild failed, falling back to snapshot");
                let catalog = self.snapshot.load()?;
                info!(
                    generated_at = %catalog.generated_at(),
                    hash = %catalog.hash(),
                    "Loaded catalog from snapshot"
                );
                Ok(catalog)
            }
        }
    }

    fn persist(&self, catalog: &StationCatalog) {
        if let Err(e) = self.snapshot.save(catalog) {
            warn!(path = %self.snapshot.path().display(), error = %e, "Failed to save catalog snapshot");
        }
    }
}
