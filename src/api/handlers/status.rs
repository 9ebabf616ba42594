//! Service info and health endpoints

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ApiState;

/// Service name reported by `/api/info`
pub const SERVICE_NAME: &str = "ERW Site Scoring Service";

/// Endpoints advertised by `/api/info`
pub const ENDPOINTS: &[&str] = &[
    "POST /api/sitescore",
    "GET /api/sites",
    "POST /api/sites",
    "GET /api/sites/:id",
    "GET /api/info",
    "GET /api/health",
    "GET /api/config",
    "POST /api/config/reload",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub name: &'static str,
    pub status: &'static str,
    pub time: DateTime<Utc>,
    pub version: &'static str,
    pub scoring_version: String,
    pub storage_backend: &'static str,
    pub endpoints: &'static [&'static str],
}

/// GET /api/info - Service description and endpoint list
pub async fn get_info(State(state): State<ApiState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: SERVICE_NAME,
        status: "UP",
        time: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        scoring_version: state.scorer.load().version().to_string(),
        storage_backend: state.store.backend_name(),
        endpoints: ENDPOINTS,
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: DateTime<Utc>,
}

/// GET /api/health - Liveness probe
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP",
        time: Utc::now(),
    })
}
