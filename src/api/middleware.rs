//! API middleware layers.
//!
//! Stamps every response with the scoring formula version that was active
//! when the request was handled.

use axum::extract::{Request, State};
use axum::http::header::HeaderName;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiState;

pub const SCORING_VERSION_HEADER: HeaderName = HeaderName::from_static("x-scoring-version");

/// Axum middleware that adds `X-Scoring-Version` to every response.
pub async fn add_scoring_version_header(
    State(state): State<ApiState>,
    request: Request,
    next: Next,
) -> Response {
    let version = state.scorer.load().version().to_string();
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&version) {
        response.headers_mut().insert(SCORING_VERSION_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware;
    use axum::routing::get;
    use axum::Router;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::scoring::SiteScorer;
    use crate::storage::InMemorySiteStore;

    #[tokio::test]
    async fn test_scoring_version_header_present() {
        let state = ApiState::new(SiteScorer::default(), Arc::new(InMemorySiteStore::new()));
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(state, add_scoring_version_header));

        let resp = app
            .oneshot(Request::get("/test").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.headers().get("x-scoring-version").unwrap(), "3.0");
    }
}
