//! Disk snapshot of the catalog.
//!
//! Written after every successful rebuild and read back when the feed is
//! unavailable, so the service can start (and keep serving) with the last
//! known station set and its original generation time.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::IngestionError;
use super::hierarchy::NamedStation;
use super::registry::{StationCatalog, content_hash};

/// Snapshot file contents, borrowed for writing.
#[derive(Debug, Serialize)]
struct SnapshotRef<'a> {
    generated_at: DateTime<Utc>,
    hash: &'a str,
    stations: &'a [NamedStation],
}

/// Snapshot file contents, owned for reading.
#[derive(Debug, Deserialize)]
struct SnapshotOwned {
    generated_at: DateTime<Utc>,
    hash: String,
    stations: Vec<NamedStation>,
}

/// Configuration for the catalog snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Path to the snapshot file.
    pub path: PathBuf,
}

impl SnapshotConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self::new("resources/catalog-snapshot.json")
    }
}

/// Reads and writes the catalog snapshot file.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    config: SnapshotConfig,
}

impl CatalogSnapshot {
    pub fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    /// Load the catalog from the snapshot.
    ///
    /// The hash is recomputed from the stored stations; a snapshot whose
    /// content does not match its recorded hash is rejected.
    pub fn load(&self) -> Result<StationCatalog, IngestionError> {
        let path = &self.config.path;

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IngestionError::NoSnapshot {
                    path: path.display().to_string(),
                });
            }
            Err(e) => {
                return Err(IngestionError::Snapshot {
                    message: format!("failed to read snapshot: {}", e),
                });
            }
        };

        let snapshot: SnapshotOwned =
            serde_json::from_str(&contents).map_err(|e| IngestionError::Snapshot {
                message: format!("failed to parse snapshot: {}", e),
            })?;

        let actual = content_hash(&snapshot.stations);
        if actual != snapshot.hash {
            return Err(IngestionError::Snapshot {
                message: format!(
                    "snapshot hash mismatch: recorded {}, computed {}",
                    snapshot.hash, actual
                ),
            });
        }

        Ok(StationCatalog::new(snapshot.stations, snapshot.generated_at))
    }

    /// Save the catalog to the snapshot.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, catalog: &StationCatalog) -> Result<(), IngestionError> {
        let snapshot = SnapshotRef {
            generated_at: catalog.generated_at(),
            hash: catalog.hash(),
            stations: catalog.stations(),
        };

        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| IngestionError::Snapshot {
                message: format!("failed to create snapshot directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(&snapshot).map_err(|e| IngestionError::Snapshot {
            message: format!("failed to serialize snapshot: {}", e),
        })?;

        std::fs::write(&self.config.path, json).map_err(|e| IngestionError::Snapshot {
            message: format!("failed to write snapshot file: {}", e),
        })?;

        Ok(())
    }

    /// Get the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }
}
