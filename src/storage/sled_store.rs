//! Sled-backed site store
//!
//! Layout:
//! - `sites` tree: big-endian `u64` id → JSON [`Site`]
//! - `site_names` tree: `len(name) name region` → big-endian id (uniqueness index)
//! - `meta` tree: `next_id` counter
//!
//! Inserts run as one transaction over all three trees, so a rejected
//! duplicate never consumes an id and the index cannot drift from the data.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use sled::transaction::{ConflictableTransactionError, TransactionError, Transactional};
use tracing::warn;

use super::{SiteRepository, StorageError};
use crate::config::defaults::SITES_TREE;
use crate::types::{NewSite, Site, SitePage, SiteQuery};

const NAMES_TREE: &str = "site_names";
const META_TREE: &str = "meta";
const NEXT_ID_KEY: &[u8] = b"next_id";

/// Durable site store on an embedded sled database
pub struct SledSiteStore {
    db: Arc<sled::Db>,
    sites: sled::Tree,
    names: sled::Tree,
    meta: sled::Tree,
}

impl SledSiteStore {
    /// Open or create the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path)
            .with_context(|| format!("Failed to open site store at {}", path.display()))?;
        Self::from_db(db)
    }

    /// Temporary database that is removed on drop.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .context("Failed to open temporary site store")?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self> {
        let sites = db.open_tree(SITES_TREE).context("Failed to open sites tree")?;
        let names = db.open_tree(NAMES_TREE).context("Failed to open site name index")?;
        let meta = db.open_tree(META_TREE).context("Failed to open meta tree")?;
        Ok(Self {
            db: Arc::new(db),
            sites,
            names,
            meta,
        })
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

/// Index key: big-endian `u32` name length, name bytes, region bytes.
fn name_key(name: &str, region: &str) -> Vec<u8> {
    let name_len = u32::try_from(name.len()).unwrap_or(u32::MAX);
    let mut key = Vec::with_capacity(4 + name.len() + region.len());
    key.extend_from_slice(&name_len.to_be_bytes());
    key.extend_from_slice(name.as_bytes());
    key.extend_from_slice(region.as_bytes());
    key
}

fn decode_id(bytes: &[u8]) -> Option<u64> {
    <[u8; 8]>::try_from(bytes).ok().map(u64::from_be_bytes)
}

impl SiteRepository for SledSiteStore {
    fn insert(&self, site: NewSite) -> Result<Site, StorageError> {
        let index_key = name_key(&site.name, &site.region);

        let result = (&self.sites, &self.names, &self.meta).transaction(|(sites, names, meta)| {
            if names.get(index_key.as_slice())?.is_some() {
                return sled::transaction::abort(StorageError::Duplicate {
                    name: site.name.clone(),
                    region: site.region.clone(),
                });
            }

            let id = meta
                .get(NEXT_ID_KEY)?
                .and_then(|v| decode_id(&v))
                .unwrap_or(1);
            let stored = site.clone().into_site(id);
            let value = serde_json::to_vec(&stored)
                .map_err(|e| ConflictableTransactionError::Abort(StorageError::from(e)))?;

            sites.insert(id.to_be_bytes().to_vec(), value)?;
            names.insert(index_key.clone(), id.to_be_bytes().to_vec())?;
            meta.insert(NEXT_ID_KEY, (id + 1).to_be_bytes().to_vec())?;
            Ok(stored)
        });

        match result {
            Ok(stored) => Ok(stored),
            Err(TransactionError::Abort(err)) => Err(err),
            Err(TransactionError::Storage(err)) => Err(err.into()),
        }
    }

    fn get(&self, id: u64) -> Result<Option<Site>, StorageError> {
        match self.sites.get(id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn list(&self, query: &SiteQuery) -> Result<SitePage, StorageError> {
        let mut sites = Vec::new();
        for entry in self.sites.iter() {
            let (key, value) = entry?;
            match serde_json::from_slice::<Site>(&value) {
                Ok(site) => sites.push(site),
                Err(e) => warn!(id = ?decode_id(&key), "Skipping undecodable site record: {}", e),
            }
        }
        Ok(query.apply(sites))
    }

    fn count(&self) -> Result<usize, StorageError> {
        Ok(self.sites.len())
    }

    fn backend_name(&self) -> &'static str {
        "Sled"
    }
}
