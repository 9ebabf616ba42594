//! API route definitions
//!
//! Everything is mounted under `/api`:
//! - /sitescore - stateless scoring
//! - /sites, /sites/:id - registered sites
//! - /info, /health - service metadata
//! - /config, /config/reload - active scoring config

use axum::{routing::{get, post}, Router};

use super::handlers::{self, ApiState};

/// Create all API routes
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/sitescore", post(handlers::score_site))
        .route("/sites", get(handlers::list_sites).post(handlers::register_site))
        .route("/sites/:id", get(handlers::get_site))
        .route("/info", get(handlers::get_info))
        .route("/health", get(handlers::get_health))
        .route("/config", get(handlers::get_config))
        .route("/config/reload", post(handlers::reload_config))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::SiteScorer;
    use crate::storage::InMemorySiteStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_state() -> ApiState {
        ApiState::new(SiteScorer::default(), Arc::new(InMemorySiteStore::new()))
    }

    #[tokio::test]
    async fn test_api_routes_health() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_empty_listing() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/sites?size=500")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["size"], 100);
        assert_eq!(v["total"], 0);
    }

    #[tokio::test]
    async fn test_api_routes_unknown_site_is_404() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/sites/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reload_without_config_file_is_rejected() {
        let app = api_routes(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/config/reload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
