//! ERW Site Scoring
//!
//! Suitability, carbon and cost assessment of candidate Enhanced Rock
//! Weathering sites.
//!
//! ## Architecture
//!
//! - **Scoring**: pure, versioned, table-driven scoring engine
//! - **Validation**: range checks on raw scoring requests
//! - **Config**: TOML service and scoring configuration with hot reload
//! - **Storage**: registered sites behind a pluggable repository
//! - **API**: Axum HTTP surface over all of the above

pub mod api;
pub mod config;
pub mod scoring;
pub mod storage;
pub mod types;
pub mod validation;

// Re-export configuration
pub use config::{ScoringConfig, ServiceConfig};

// Re-export commonly used types
pub use types::{
    NewSite, ScoreBreakdown, Site, SiteAssessment, SitePage, SiteParameters, SiteQuery,
    SustainabilityGrade,
};

// Re-export the scoring engine
pub use scoring::SiteScorer;

// Re-export storage
pub use storage::{SiteRepository, StorageError};

// Re-export validation
pub use validation::{SiteScoreRequest, ValidationError};
