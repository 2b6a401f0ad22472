//! HTTP server for PawMe Connect
//!
//! Exposes the provider connection lifecycle (connect, callback, status,
//! disconnect, refresh) and the read-only proxy under `/api`, plus health
//! and OpenAPI endpoints.

pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use pm_types::AppResult;
use state::AppState;

/// Assemble the application router
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/openapi.json", get(serve_openapi_json))
        .route("/api/auth/{provider}/connect", get(routes::auth::connect))
        .route("/api/auth/{provider}/callback", get(routes::auth::callback))
        .route("/api/auth/{provider}/status", get(routes::auth::status))
        .route(
            "/api/auth/{provider}/disconnect",
            post(routes::auth::disconnect),
        )
        .route("/api/auth/{provider}/refresh", post(routes::auth::refresh))
        .route("/api/{provider}", get(routes::proxy::provider_proxy))
        .with_state(state);

    Router::new()
        .merge(api)
        .merge(Scalar::with_url("/docs", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// GET /health - liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Server is up"))
)]
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /openapi.json - machine-readable API description
pub async fn serve_openapi_json() -> Json<serde_json::Value> {
    Json(serde_json::to_value(openapi::ApiDoc::openapi()).unwrap_or_default())
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, addr: SocketAddr) -> AppResult<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::test_state;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::build_router(test_state(&dir).await);

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::build_router(test_state(&dir).await);

        let request = Request::builder()
            .uri("/nonexistent")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::build_router(test_state(&dir).await);

        // disconnect is POST-only
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/auth/tiktok/disconnect")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_openapi_json_served() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::build_router(test_state(&dir).await);

        let request = Request::builder()
            .uri("/openapi.json")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
