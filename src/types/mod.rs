//! Shared data structures for ERW site assessment
//!
//! - `SiteParameters`: validated raw readings for one candidate site
//! - `SiteAssessment` / `ScoreBreakdown`: scoring output
//! - `SustainabilityGrade`: discrete A+..F rating
//! - `Site`, `SiteQuery`, `SitePage`: stored sites and paged listing

mod site;
mod listing;

pub use site::*;
pub use listing::*;
