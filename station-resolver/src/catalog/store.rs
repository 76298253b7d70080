//! The published catalog.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use super::registry::StationCatalog;

/// Thread-safe handle to the currently published catalog.
///
/// Readers take an `Arc` snapshot and work against it for the whole query;
/// a concurrent [`publish`](Self::publish) swaps the pointer and never
/// touches a catalog that is being read.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<RwLock<Arc<StationCatalog>>>,
}

impl CatalogStore {
    pub fn new(catalog: StationCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// The catalog to answer the current query with.
    pub async fn current(&self) -> Arc<StationCatalog> {
        let guard = self.inner.read().await;
        guard.clone()
    }

    /// Replace the published catalog.
    pub async fn publish(&self, catalog: StationCatalog) {
        let catalog = Arc::new(catalog);
        info!(
            hash = %catalog.hash(),
            stations = catalog.len(),
            generated_at = %catalog.generated_at(),
            "Publishing catalog"
        );

        let mut guard = self.inner.write().await;
        *guard = catalog;
    }
}
