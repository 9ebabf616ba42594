//! Site scoring endpoint

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use super::ApiState;
use crate::api::envelope::ApiError;
use crate::types::SiteAssessment;
use crate::validation::SiteScoreRequest;

/// POST /api/sitescore - Validate and score one candidate site
///
/// Nothing is stored. Every out-of-range field is reported in one
/// `VALIDATION_FAILED` response.
pub async fn score_site(
    State(state): State<ApiState>,
    payload: Result<Json<SiteScoreRequest>, JsonRejection>,
) -> Result<Json<SiteAssessment>, ApiError> {
    let Json(request) = payload?;
    let params = request.into_parameters()?;
    let assessment = state.scorer.load().score(&params);
    Ok(Json(assessment))
}
