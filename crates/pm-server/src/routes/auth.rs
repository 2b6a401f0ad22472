//! Provider connection endpoints: connect, callback, status, disconnect,
//! refresh

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::{IntoParams, ToSchema};

use pm_oauth::{
    build_authorization_url, generate_pkce_challenge, generate_state, AuthorizeParams,
    ExchangeRequest, PkceSession, ProviderCredentials, RefreshRequest,
};
use pm_providers::{OAuthEndpoints, ProviderAuth, ProviderSpec};
use pm_types::AppError;

use crate::routes::error::ApiErrorResponse;
use crate::state::AppState;

/// Connection status as reported to the admin dashboard
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub connected: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expired: Option<bool>,
}

impl StatusResponse {
    fn not_connected() -> Self {
        Self {
            connected: false,
            display_name: None,
            account_id: None,
            expires_at: None,
            is_expired: None,
        }
    }

    fn connected(credentials: ProviderCredentials, now: DateTime<Utc>) -> Self {
        let is_expired = credentials.is_expired(now);
        Self {
            connected: true,
            display_name: credentials.display_name,
            account_id: credentials.account_id,
            expires_at: credentials.expires_at,
            is_expired: Some(is_expired),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DisconnectResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Query parameters the provider sends to the callback
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set when the user denied access or the provider rejected the request
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Client-side settings an OAuth provider needs, resolved from config
struct OAuthClientConfig {
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
    scopes: Vec<String>,
}

/// Resolve a provider that supports the OAuth connect flow
fn oauth_provider<'a>(
    state: &'a AppState,
    provider: &str,
) -> Result<(&'a ProviderSpec, &'a OAuthEndpoints), ApiErrorResponse> {
    let spec = state.registry.get(provider).ok_or_else(|| {
        ApiErrorResponse::bad_request(format!("Unknown provider '{}'", provider))
    })?;

    let oauth = spec.oauth().ok_or_else(|| {
        ApiErrorResponse::bad_request(format!(
            "Provider '{}' does not support OAuth connect",
            spec.name
        ))
    })?;

    Ok((spec, oauth))
}

/// Resolve the client credentials for a provider, or fail with a
/// configuration error
fn client_config(
    state: &AppState,
    provider: &str,
    oauth: &OAuthEndpoints,
) -> Result<OAuthClientConfig, ApiErrorResponse> {
    let settings = state.config.provider(provider).unwrap_or_default();

    let Some(client_id) = settings.client_id else {
        error!("No client id configured for provider: {}", provider);
        return Err(AppError::Config(format!(
            "Missing client credentials for provider '{}'",
            provider
        ))
        .into());
    };

    let Some(redirect_uri) = settings.redirect_uri else {
        error!("No redirect URI configured for provider: {}", provider);
        return Err(AppError::Config(format!(
            "Missing redirect URI for provider '{}'",
            provider
        ))
        .into());
    };

    let scopes = settings.scopes.unwrap_or_else(|| {
        oauth
            .default_scopes
            .iter()
            .map(|s| s.to_string())
            .collect()
    });

    Ok(OAuthClientConfig {
        client_id,
        client_secret: settings.client_secret,
        redirect_uri,
        scopes,
    })
}

/// 302 to the given location
fn redirect(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

/// GET /api/auth/{provider}/connect - start an authorization attempt
///
/// The client configuration is validated before any PKCE material is
/// generated, and the PKCE session is persisted before the redirect is
/// issued; a storage failure aborts the flow instead of sending the admin
/// into a dead-end authorization.
#[utoipa::path(
    get,
    path = "/api/auth/{provider}/connect",
    tag = "auth",
    params(("provider" = String, Path, description = "Provider name")),
    responses(
        (status = 302, description = "Redirect to the provider authorization page"),
        (status = 400, description = "Unknown provider, or provider without an OAuth flow", body = super::error::ErrorBody),
        (status = 500, description = "Missing client configuration or storage failure", body = super::error::ErrorBody)
    )
)]
pub async fn connect(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Response, ApiErrorResponse> {
    let (spec, oauth) = oauth_provider(&state, &provider)?;
    let client = client_config(&state, spec.name, oauth)?;

    let pkce = generate_pkce_challenge()?;
    let csrf_state = generate_state()?;

    let session = PkceSession::new(csrf_state.clone(), pkce.code_verifier.clone());
    state.store.begin_auth(spec.name, session).await?;

    let url = build_authorization_url(&AuthorizeParams {
        authorize_url: oauth.authorize_url,
        client_param: oauth.client_param,
        client_id: &client.client_id,
        redirect_uri: &client.redirect_uri,
        scopes: &client.scopes,
        code_challenge: &pkce.code_challenge,
        state: &csrf_state,
    });

    info!("Starting OAuth flow for provider: {}", spec.name);

    Ok(redirect(&url))
}

/// GET /api/auth/{provider}/callback - complete an authorization attempt
///
/// The pending session is consumed on a matching state; expired or
/// mismatched callbacks are rejected before any token exchange happens.
#[utoipa::path(
    get,
    path = "/api/auth/{provider}/callback",
    tag = "auth",
    params(
        ("provider" = String, Path, description = "Provider name"),
        CallbackQuery
    ),
    responses(
        (status = 302, description = "Connected; redirect to the admin dashboard"),
        (status = 400, description = "Provider error, missing parameters, or state mismatch", body = super::error::ErrorBody),
        (status = 502, description = "Token exchange failed", body = super::error::ErrorBody)
    )
)]
pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, ApiErrorResponse> {
    let (spec, oauth) = oauth_provider(&state, &provider)?;

    if let Some(provider_error) = query.error {
        let detail = query.error_description.unwrap_or(provider_error);
        warn!(
            "Provider {} reported authorization error: {}",
            spec.name, detail
        );
        return Err(ApiErrorResponse::bad_request(format!(
            "Authorization failed: {}",
            detail
        )));
    }

    let (Some(code), Some(csrf_state)) = (query.code, query.state) else {
        return Err(ApiErrorResponse::bad_request(
            "Missing code or state parameter",
        ));
    };

    let session = state.store.take_session(spec.name, &csrf_state).await?;
    let client = client_config(&state, spec.name, oauth)?;

    let tokens = state
        .exchanger
        .exchange_code(&ExchangeRequest {
            token_url: oauth.token_url,
            client_param: oauth.client_param,
            client_id: &client.client_id,
            client_secret: client.client_secret.as_deref(),
            redirect_uri: &client.redirect_uri,
            code: &code,
            code_verifier: &session.code_verifier,
        })
        .await?;

    let mut credentials = ProviderCredentials::from_tokens(&tokens);

    // Best-effort profile decoration; a failure leaves the fields empty
    if let Some(profile) = &oauth.profile {
        match state
            .fetcher
            .fetch_profile(profile, &credentials.access_token)
            .await
        {
            Ok(fields) => {
                credentials.display_name = fields.display_name;
                if fields.account_id.is_some() {
                    credentials.account_id = fields.account_id;
                }
            }
            Err(e) => warn!("Profile fetch for {} failed: {}", spec.name, e),
        }
    }

    state.store.store_credentials(spec.name, credentials).await?;

    info!("Provider {} connected", spec.name);

    let target = state.config.get().server.post_connect_redirect;
    Ok(redirect(&target))
}

/// GET /api/auth/{provider}/status - report the connection state
///
/// One of three observable states: not connected, connected, or connected
/// but expired. A missing record is a normal answer, not an error.
#[utoipa::path(
    get,
    path = "/api/auth/{provider}/status",
    tag = "auth",
    params(("provider" = String, Path, description = "Provider name")),
    responses(
        (status = 200, description = "Connection status", body = StatusResponse),
        (status = 400, description = "Unknown provider", body = super::error::ErrorBody)
    )
)]
pub async fn status(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Json<StatusResponse>, ApiErrorResponse> {
    let spec = state.registry.get(&provider).ok_or_else(|| {
        ApiErrorResponse::bad_request(format!("Unknown provider '{}'", provider))
    })?;

    // Key-based providers have no credential record; connected means a key
    // is configured
    if matches!(spec.auth, ProviderAuth::ApiKey { .. }) {
        let configured = state
            .config
            .provider(spec.name)
            .and_then(|s| s.api_key)
            .is_some();
        let mut response = StatusResponse::not_connected();
        response.connected = configured;
        return Ok(Json(response));
    }

    let response = match state.store.credentials(spec.name).await {
        None => StatusResponse::not_connected(),
        Some(credentials) => StatusResponse::connected(credentials, Utc::now()),
    };

    Ok(Json(response))
}

/// POST /api/auth/{provider}/disconnect - revoke the stored connection
///
/// Idempotent: deleting a provider that was never connected still succeeds.
#[utoipa::path(
    post,
    path = "/api/auth/{provider}/disconnect",
    tag = "auth",
    params(("provider" = String, Path, description = "Provider name")),
    responses(
        (status = 200, description = "Connection removed (or was already absent)", body = DisconnectResponse),
        (status = 400, description = "Unknown provider, or provider without an OAuth flow", body = super::error::ErrorBody),
        (status = 500, description = "Storage failure", body = super::error::ErrorBody)
    )
)]
pub async fn disconnect(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Json<DisconnectResponse>, ApiErrorResponse> {
    let (spec, _) = oauth_provider(&state, &provider)?;

    state.store.delete(spec.name).await?;

    info!("Provider {} disconnected", spec.name);

    Ok(Json(DisconnectResponse { success: true }))
}

/// POST /api/auth/{provider}/refresh - rotate the stored access token
#[utoipa::path(
    post,
    path = "/api/auth/{provider}/refresh",
    tag = "auth",
    params(("provider" = String, Path, description = "Provider name")),
    responses(
        (status = 200, description = "Token refreshed", body = RefreshResponse),
        (status = 400, description = "Not connected, or no refresh token stored", body = super::error::ErrorBody),
        (status = 502, description = "Refresh rejected by the provider", body = super::error::ErrorBody)
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Json<RefreshResponse>, ApiErrorResponse> {
    let (spec, oauth) = oauth_provider(&state, &provider)?;

    let Some(current) = state.store.credentials(spec.name).await else {
        return Err(AppError::NotConnected(format!(
            "no credentials stored for '{}'",
            spec.name
        ))
        .into());
    };

    let Some(refresh_token) = current.refresh_token.clone() else {
        return Err(ApiErrorResponse::bad_request(format!(
            "No refresh token stored for provider '{}'",
            spec.name
        )));
    };

    let client = client_config(&state, spec.name, oauth)?;

    let tokens = state
        .exchanger
        .refresh_tokens(&RefreshRequest {
            token_url: oauth.token_url,
            client_param: oauth.client_param,
            client_id: &client.client_id,
            client_secret: client.client_secret.as_deref(),
            refresh_token: &refresh_token,
        })
        .await?;

    let mut credentials = ProviderCredentials::from_tokens(&tokens);
    // Profile fields survive a refresh; they are only refetched on connect
    credentials.display_name = current.display_name;
    if credentials.account_id.is_none() {
        credentials.account_id = current.account_id;
    }
    let expires_at = credentials.expires_at;

    state.store.store_credentials(spec.name, credentials).await?;

    info!("Refreshed tokens for provider: {}", spec.name);

    Ok(Json(RefreshResponse {
        success: true,
        expires_at,
    }))
}
