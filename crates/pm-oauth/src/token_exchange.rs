//! Token exchange and refresh against provider token endpoints

use chrono::{DateTime, Duration, Utc};
use pm_types::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info};

use crate::types::OAuthTokens;

/// Safety buffer subtracted from provider-reported token lifetimes so a
/// token is treated as expired slightly before the provider would reject it
const EXPIRY_BUFFER_SECS: i64 = 300;

/// Token response from a provider token endpoint
#[derive(Debug, Deserialize, Serialize)]
struct TokenResponse {
    access_token: String,

    #[serde(default)]
    token_type: String,

    #[serde(default)]
    expires_in: Option<i64>,

    #[serde(default)]
    refresh_token: Option<String>,

    #[serde(default)]
    scope: Option<String>,

    /// Account identifier some platforms include alongside the token
    #[serde(default)]
    open_id: Option<String>,
}

/// Inputs for exchanging an authorization code
#[derive(Debug)]
pub struct ExchangeRequest<'a> {
    pub token_url: &'a str,
    /// Provider's name for the client identifier ("client_id" or
    /// "client_key")
    pub client_param: &'a str,
    pub client_id: &'a str,
    pub client_secret: Option<&'a str>,
    pub redirect_uri: &'a str,
    pub code: &'a str,
    pub code_verifier: &'a str,
}

/// Inputs for refreshing an access token
#[derive(Debug)]
pub struct RefreshRequest<'a> {
    pub token_url: &'a str,
    pub client_param: &'a str,
    pub client_id: &'a str,
    pub client_secret: Option<&'a str>,
    pub refresh_token: &'a str,
}

/// Token exchanger for OAuth flows
pub struct TokenExchanger {
    client: Client,
}

impl TokenExchanger {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Exchange an authorization code (plus PKCE verifier) for tokens
    pub async fn exchange_code(&self, request: &ExchangeRequest<'_>) -> AppResult<OAuthTokens> {
        let mut params = HashMap::new();
        params.insert("grant_type".to_string(), "authorization_code".to_string());
        params.insert(request.client_param.to_string(), request.client_id.to_string());
        params.insert("code".to_string(), request.code.to_string());
        params.insert("redirect_uri".to_string(), request.redirect_uri.to_string());
        params.insert("code_verifier".to_string(), request.code_verifier.to_string());

        if let Some(client_secret) = request.client_secret {
            params.insert("client_secret".to_string(), client_secret.to_string());
        }

        let tokens = self.post_token_request(request.token_url, &params).await?;
        info!("Token exchange successful");

        Ok(tokens)
    }

    /// Refresh tokens using a refresh token
    ///
    /// If the provider does not rotate the refresh token, the original one is
    /// carried forward so the connection stays refreshable.
    pub async fn refresh_tokens(&self, request: &RefreshRequest<'_>) -> AppResult<OAuthTokens> {
        let mut params = HashMap::new();
        params.insert("grant_type".to_string(), "refresh_token".to_string());
        params.insert(request.client_param.to_string(), request.client_id.to_string());
        params.insert(
            "refresh_token".to_string(),
            request.refresh_token.to_string(),
        );

        if let Some(client_secret) = request.client_secret {
            params.insert("client_secret".to_string(), client_secret.to_string());
        }

        let mut tokens = self.post_token_request(request.token_url, &params).await?;
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(request.refresh_token.to_string());
        }
        info!("Token refresh successful");

        Ok(tokens)
    }

    /// Send a form-encoded token request and parse the response
    async fn post_token_request(
        &self,
        token_url: &str,
        params: &HashMap<String, String>,
    ) -> AppResult<OAuthTokens> {
        let response = self
            .client
            .post(token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::OAuth(format!("Failed to send token request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Token request failed with status {}: {}", status, body);
            return Err(AppError::OAuth(format!(
                "Token request failed with status {}: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::OAuth(format!("Failed to parse token response: {}", e)))?;

        let now = Utc::now();
        Ok(OAuthTokens {
            access_token: token_response.access_token,
            refresh_token: token_response.refresh_token,
            token_type: token_response.token_type,
            expires_in: token_response.expires_in,
            expires_at: compute_expires_at(token_response.expires_in, now),
            scope: token_response.scope,
            open_id: token_response.open_id,
            acquired_at: now,
        })
    }
}

impl Default for TokenExchanger {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute expiry from a relative lifetime, with the safety buffer applied
fn compute_expires_at(expires_in: Option<i64>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    expires_in.map(|secs| now + Duration::seconds((secs - EXPIRY_BUFFER_SECS).max(0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_deserialization() {
        let json = r#"{
            "access_token": "test_access",
            "token_type": "Bearer",
            "expires_in": 86400,
            "refresh_token": "test_refresh",
            "scope": "user.info.basic",
            "open_id": "open-123"
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "test_access");
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, Some(86400));
        assert_eq!(response.refresh_token, Some("test_refresh".to_string()));
        assert_eq!(response.open_id, Some("open-123".to_string()));
    }

    #[test]
    fn test_token_response_minimal() {
        let json = r#"{
            "access_token": "test_access"
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "test_access");
        assert_eq!(response.token_type, ""); // default
        assert_eq!(response.expires_in, None);
        assert_eq!(response.refresh_token, None);
        assert_eq!(response.open_id, None);
    }

    #[test]
    fn test_compute_expires_at_applies_buffer() {
        let now = Utc::now();
        let expires_at = compute_expires_at(Some(3600), now).unwrap();
        assert_eq!(expires_at - now, Duration::seconds(3600 - EXPIRY_BUFFER_SECS));
    }

    #[test]
    fn test_compute_expires_at_short_lifetime_clamps_to_now() {
        let now = Utc::now();
        let expires_at = compute_expires_at(Some(60), now).unwrap();
        assert_eq!(expires_at, now);
    }

    #[test]
    fn test_compute_expires_at_none() {
        assert_eq!(compute_expires_at(None, Utc::now()), None);
    }
}
