//! Authenticated pass-through endpoint for provider APIs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

use pm_providers::{ProviderAuth, ProxyAuth};
use pm_types::AppError;

use crate::routes::error::ApiErrorResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProxyQuery {
    /// Endpoint selector: "stats", "videos", or "posts" depending on the
    /// provider
    pub endpoint: String,
}

/// GET /api/{provider}?endpoint=… - relay a read-only provider API call
///
/// The provider's response body is returned verbatim with its status code;
/// there is no retrying, rate limiting, or schema validation on this path.
#[utoipa::path(
    get,
    path = "/api/{provider}",
    tag = "proxy",
    params(
        ("provider" = String, Path, description = "Provider name"),
        ProxyQuery
    ),
    responses(
        (status = 200, description = "Provider response, passed through verbatim"),
        (status = 400, description = "Unknown provider/endpoint, or provider not connected", body = super::error::ErrorBody),
        (status = 502, description = "Provider unreachable", body = super::error::ErrorBody)
    )
)]
pub async fn provider_proxy(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, ApiErrorResponse> {
    let spec = state.registry.get(&provider).ok_or_else(|| {
        ApiErrorResponse::bad_request(format!("Unknown provider '{}'", provider))
    })?;

    // Selector validation comes first; a bad selector never touches the
    // connection store
    let url = spec.endpoint_url(&query.endpoint).ok_or_else(|| {
        ApiErrorResponse::bad_request(format!(
            "Unknown endpoint '{}' for provider '{}'",
            query.endpoint, spec.name
        ))
    })?;

    let response = match spec.auth {
        ProviderAuth::OAuth(_) => {
            let Some(credentials) = state.store.credentials(spec.name).await else {
                return Err(AppError::NotConnected(format!(
                    "no access token stored for '{}'",
                    spec.name
                ))
                .into());
            };
            state
                .fetcher
                .fetch(url, &ProxyAuth::Bearer(&credentials.access_token))
                .await?
        }
        ProviderAuth::ApiKey { query_param } => {
            let Some(api_key) = state.config.provider(spec.name).and_then(|s| s.api_key) else {
                return Err(AppError::NotConnected(format!(
                    "no API key configured for '{}'",
                    spec.name
                ))
                .into());
            };
            state
                .fetcher
                .fetch(
                    url,
                    &ProxyAuth::QueryKey {
                        param: query_param,
                        key: &api_key,
                    },
                )
                .await?
        }
    };

    debug!(
        "Proxied {} {} -> {}",
        spec.name, query.endpoint, response.status
    );

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((
        status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::super::testing::{body_json, test_state};
    use crate::build_router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get(app: axum::Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir).await);

        let response = get(app, "/api/myspace?endpoint=stats").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_endpoint_selector() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir).await);

        let response = get(app, "/api/tiktok?endpoint=followers").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("endpoint"));
    }

    #[tokio::test]
    async fn test_missing_endpoint_parameter() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir).await);

        let response = get(app, "/api/tiktok").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oauth_provider_without_connection() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir).await);

        // No credential record: the request fails without any outbound call
        let response = get(app, "/api/tiktok?endpoint=stats").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("not connected"));
    }

    #[tokio::test]
    async fn test_key_provider_without_key() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir).await);

        let response = get(app, "/api/instagram?endpoint=stats").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("API key"));
    }
}
