//! Station catalog: clustering, annotation, registry and lifecycle.
//!
//! The catalog is built from the raw stop feed in one pass and then frozen.
//! Each rebuild produces a new immutable [`StationCatalog`] that is swapped
//! into the [`CatalogStore`] atomically; queries in flight keep the
//! version they started with.

mod annotate;
mod cluster;
mod config;
mod error;
mod hierarchy;
pub mod path;
mod refresh;
mod registry;
mod snapshot;
mod store;

pub use annotate::{AddressAnnotator, AnnotationReport, ReverseGeocoder, disambiguate};
pub use cluster::StationClusterer;
pub use config::{AnnotateConfig, ClusterConfig, GeocodeFailurePolicy, InvalidFailurePolicy};
pub use error::IngestionError;
pub use hierarchy::{ExtendedStation, LogicalStation, NamedStation, NamedStationId};
pub use path::StationRef;
pub use refresh::{CatalogRefresher, StopFeed};
pub use registry::{StationCatalog, content_hash};
pub use snapshot::{CatalogSnapshot, SnapshotConfig};
pub use store::CatalogStore;
