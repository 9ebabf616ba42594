//! In-memory site store
//!
//! Thread-safe via `RwLock`. Not durable, data is lost on restart.

use std::sync::RwLock;

use super::{SiteRepository, StorageError};
use crate::types::{NewSite, Site, SitePage, SiteQuery};

#[derive(Debug)]
struct State {
    sites: Vec<Site>,
    next_id: u64,
}

/// In-memory site store for testing and minimal deployments
#[derive(Debug)]
pub struct InMemorySiteStore {
    state: RwLock<State>,
}

impl InMemorySiteStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                sites: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for InMemorySiteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteRepository for InMemorySiteStore {
    fn insert(&self, site: NewSite) -> Result<Site, StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        if state
            .sites
            .iter()
            .any(|s| s.name == site.name && s.region == site.region)
        {
            return Err(StorageError::Duplicate {
                name: site.name,
                region: site.region,
            });
        }

        let id = state.next_id;
        state.next_id += 1;
        let site = site.into_site(id);
        state.sites.push(site.clone());
        Ok(site)
    }

    fn get(&self, id: u64) -> Result<Option<Site>, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(state.sites.iter().find(|s| s.id == id).cloned())
    }

    fn list(&self, query: &SiteQuery) -> Result<SitePage, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(query.apply(state.sites.iter().cloned()))
    }

    fn count(&self) -> Result<usize, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(state.sites.len())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}
