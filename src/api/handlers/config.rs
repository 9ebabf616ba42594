//! Scoring config endpoints

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::ApiState;
use crate::api::envelope::ApiError;
use crate::config::ScoringConfig;

/// GET /api/config - Return the active scoring configuration
///
/// Includes every normalizer constant, weight group, carbon and cost rate,
/// and the ordered grade table.
pub async fn get_config(State(state): State<ApiState>) -> Json<ScoringConfig> {
    Json(state.scorer.load().config().clone())
}

/// Response after a reload attempt
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub version: String,
    /// `key: old -> new` for every changed scoring key
    pub changes: Vec<String>,
}

/// POST /api/config/reload - Re-read the scoring section from the config file
///
/// An invalid file is rejected with `VALIDATION_FAILED` and the active
/// scorer is left in place.
pub async fn reload_config(State(state): State<ApiState>) -> Result<Json<ReloadResponse>, ApiError> {
    let path = state
        .config_path
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Service was started without a config file".to_string()))?;

    let changes = crate::config::reload_scorer(path, &state.scorer)?;

    Ok(Json(ReloadResponse {
        version: state.scorer.load().version().to_string(),
        changes: changes.iter().map(ToString::to_string).collect(),
    }))
}
