//! Site registration, lookup and listing endpoints

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiState;
use crate::api::envelope::ApiError;
use crate::types::{NewSite, Site, SiteAssessment, SitePage, SiteQuery};
use crate::validation::{check_site_identity, SiteScoreRequest, ValidationError};

// ============================================================================
// Listing
// ============================================================================

/// Raw listing parameters; normalized by [`SiteQuery::from_params`].
#[derive(Debug, Default, Deserialize)]
pub struct ListSitesParams {
    pub region: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// GET /api/sites - Paged, sorted, region-filtered site listing
pub async fn list_sites(
    State(state): State<ApiState>,
    params: Result<Query<ListSitesParams>, QueryRejection>,
) -> Result<Json<SitePage>, ApiError> {
    let Query(params) = params?;
    let query = SiteQuery::from_params(
        params.region.as_deref(),
        params.sort.as_deref(),
        params.dir.as_deref(),
        params.page,
        params.size,
    );
    Ok(Json(state.store.list(&query)?))
}

/// GET /api/sites/:id - Single stored site
pub async fn get_site(
    State(state): State<ApiState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Site>, ApiError> {
    let Path(id) = id?;
    state
        .store
        .get(id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Site {id} not found")))
}

// ============================================================================
// Registration
// ============================================================================

/// Request body for registering a site
#[derive(Debug, Deserialize)]
pub struct RegisterSiteRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub parameters: SiteScoreRequest,
}

/// Stored site together with the assessment that produced its score
#[derive(Debug, Serialize)]
pub struct RegisteredSite {
    pub site: Site,
    pub assessment: SiteAssessment,
}

/// POST /api/sites - Score a site and store it under `(name, region)`
///
/// Returns 409 if the pair is already registered.
pub async fn register_site(
    State(state): State<ApiState>,
    payload: Result<Json<RegisterSiteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisteredSite>), ApiError> {
    let Json(request) = payload?;

    let mut violations = check_site_identity(&request.name, &request.region);
    let params = match request.parameters.into_parameters() {
        Ok(params) if violations.is_empty() => params,
        Ok(_) => return Err(ValidationError { violations }.into()),
        Err(err) => {
            violations.extend(err.violations);
            return Err(ValidationError { violations }.into());
        }
    };

    let assessment = state.scorer.load().score(&params);
    let site = state.store.insert(NewSite {
        name: request.name.trim().to_string(),
        region: request.region.trim().to_string(),
        latitude: Some(params.latitude),
        longitude: Some(params.longitude),
        score: assessment.score,
    })?;

    info!(
        id = site.id,
        name = %site.name,
        region = %site.region,
        score = site.score,
        grade = %assessment.sustainability_grade,
        "Site registered"
    );

    Ok((StatusCode::CREATED, Json(RegisteredSite { site, assessment })))
}
