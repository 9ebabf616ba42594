//! Site Storage
//!
//! Persists scored sites behind the [`SiteRepository`] trait so backends can
//! be swapped without touching the API layer:
//! - [`InMemorySiteStore`]: tests and throwaway deployments
//! - [`SledSiteStore`]: durable embedded store (default)
//!
//! `(name, region)` is unique and ids are assigned by the store, starting at 1.

mod memory;
mod sled_store;

pub use memory::InMemorySiteStore;
pub use sled_store::SledSiteStore;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::{StorageBackend, StorageConfig};
use crate::types::{NewSite, Site, SitePage, SiteQuery};
use crate::validation::{check_site_identity, ValidationError};

/// Trait for pluggable site stores.
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across request handlers.
pub trait SiteRepository: Send + Sync {
    /// Assign the next id and store `site`. Fails with
    /// [`StorageError::Duplicate`] if `(name, region)` is taken.
    fn insert(&self, site: NewSite) -> Result<Site, StorageError>;

    fn get(&self, id: u64) -> Result<Option<Site>, StorageError>;

    /// Filtered, ordered, paged listing.
    fn list(&self, query: &SiteQuery) -> Result<SitePage, StorageError>;

    fn count(&self) -> Result<usize, StorageError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("site '{name}' already exists in region '{region}'")]
    Duplicate { name: String, region: String },
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Open the backend selected in `[storage]`.
pub fn open_repository(config: &StorageConfig) -> Result<Arc<dyn SiteRepository>> {
    let repo: Arc<dyn SiteRepository> = match config.backend {
        StorageBackend::Memory => Arc::new(InMemorySiteStore::new()),
        StorageBackend::Sled => {
            std::fs::create_dir_all(&config.data_dir).with_context(|| {
                format!("Failed to create data directory {}", config.data_dir.display())
            })?;
            Arc::new(SledSiteStore::open(config.data_dir.join("sites.sled"))?)
        }
    };

    tracing::info!(
        backend = repo.backend_name(),
        sites = repo.count().unwrap_or(0),
        "Site store ready"
    );
    Ok(repo)
}

/// Outcome of [`import_sites`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// `(name, region)` already registered
    pub skipped: usize,
    /// Blank or malformed name or region
    pub rejected: usize,
}

/// Bulk-load seed rows with the same identity rules as registration.
///
/// Names and regions are trimmed. Invalid rows and duplicates are logged and
/// skipped; any other storage failure aborts the import.
pub fn import_sites(
    store: &dyn SiteRepository,
    sites: impl IntoIterator<Item = NewSite>,
) -> Result<ImportSummary, StorageError> {
    let mut summary = ImportSummary::default();

    for (row, mut site) in sites.into_iter().enumerate() {
        site.name = site.name.trim().to_string();
        site.region = site.region.trim().to_string();
        let violations = check_site_identity(&site.name, &site.region);
        if !violations.is_empty() {
            summary.rejected += 1;
            tracing::warn!(row, "Invalid site, skipping: {}", ValidationError { violations });
            continue;
        }

        match store.insert(site) {
            Ok(site) => {
                summary.imported += 1;
                tracing::info!(id = site.id, name = %site.name, region = %site.region, "Imported site");
            }
            Err(StorageError::Duplicate { name, region }) => {
                summary.skipped += 1;
                tracing::warn!(%name, %region, "Site already registered, skipping");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory_backend() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            ..StorageConfig::default()
        };
        let repo = open_repository(&config).unwrap();
        assert_eq!(repo.backend_name(), "InMemory");
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_open_sled_backend_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::Sled,
            data_dir: dir.path().join("nested").join("data"),
        };
        let repo = open_repository(&config).unwrap();
        assert_eq!(repo.backend_name(), "Sled");
        assert!(config.data_dir.exists());
    }

    fn seed(name: &str, region: &str) -> NewSite {
        NewSite {
            name: name.to_string(),
            region: region.to_string(),
            latitude: None,
            longitude: None,
            score: 0.5,
        }
    }

    #[test]
    fn test_import_applies_registration_rules() {
        let store = InMemorySiteStore::new();
        let rows = vec![
            seed("  Kericho ", " Kenya"),
            seed("Kericho", "Kenya"),
            seed("   ", "Kenya"),
            seed("Nakuru", ""),
            seed("Eldo\nret", "Kenya"),
            seed("Nakuru", "Kenya"),
        ];

        let summary = import_sites(&store, rows).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                imported: 2,
                skipped: 1,
                rejected: 3,
            }
        );

        let first = store.get(1).unwrap().unwrap();
        assert_eq!(first.name, "Kericho");
        assert_eq!(first.region, "Kenya");
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_duplicate_error_message() {
        let err = StorageError::Duplicate {
            name: "Kericho".to_string(),
            region: "Kenya".to_string(),
        };
        assert_eq!(err.to_string(), "site 'Kericho' already exists in region 'Kenya'");
    }
}
