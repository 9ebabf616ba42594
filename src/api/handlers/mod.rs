//! API route handlers
//!
//! Request handling logic for all API endpoints:
//! - Site scoring
//! - Site registration, lookup and paged listing
//! - Service info and health
//! - Scoring config view and reload

mod config;
mod scoring;
mod sites;
mod status;

pub use config::*;
pub use scoring::*;
pub use sites::*;
pub use status::*;

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::scoring::SiteScorer;
use crate::storage::SiteRepository;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Active scorer, swapped atomically on config reload
    pub scorer: Arc<ArcSwap<SiteScorer>>,
    /// Site store
    pub store: Arc<dyn SiteRepository>,
    /// Config file that `POST /api/config/reload` re-reads, if any
    pub config_path: Option<PathBuf>,
}

impl ApiState {
    pub fn new(scorer: SiteScorer, store: Arc<dyn SiteRepository>) -> Self {
        Self {
            scorer: Arc::new(ArcSwap::from_pointee(scorer)),
            store,
            config_path: None,
        }
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }
}
