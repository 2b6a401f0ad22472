//! Authenticated pass-through calls to provider APIs

use pm_types::{AppError, AppResult};
use reqwest::Client;
use tracing::{debug, warn};

use crate::registry::{ProfileFields, ProfileSpec};

/// Credential applied to an outbound provider call
#[derive(Debug)]
pub enum ProxyAuth<'a> {
    /// OAuth access token in the Authorization header
    Bearer(&'a str),
    /// Configured API key appended as a query parameter
    QueryKey { param: &'static str, key: &'a str },
}

/// Verbatim provider response
///
/// The body is returned untouched; callers relay it without schema
/// validation, retries, or rate limiting.
#[derive(Debug)]
pub struct ProxyResponse {
    pub status: u16,
    pub body: String,
}

/// Issues authenticated read-only calls to provider endpoints
pub struct ProxyFetcher {
    client: Client,
}

impl ProxyFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// GET a provider endpoint and pass the response through
    ///
    /// Provider-side errors (4xx/5xx) are part of the pass-through contract
    /// and come back as a `ProxyResponse`; only transport failures are
    /// errors.
    pub async fn fetch(&self, url: &str, auth: &ProxyAuth<'_>) -> AppResult<ProxyResponse> {
        let request = match auth {
            ProxyAuth::Bearer(token) => self.client.get(url).bearer_auth(token),
            ProxyAuth::QueryKey { param, key } => self.client.get(url).query(&[(*param, *key)]),
        };

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Request to provider failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to read provider response: {}", e)))?;

        debug!("Provider responded with status {}", status);

        Ok(ProxyResponse { status, body })
    }

    /// Fetch profile fields for a freshly connected account
    ///
    /// Best-effort decoration: callers treat a failure here as non-fatal, so
    /// this logs and propagates without retrying.
    pub async fn fetch_profile(
        &self,
        profile: &ProfileSpec,
        access_token: &str,
    ) -> AppResult<ProfileFields> {
        let response = self
            .client
            .get(profile.url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Profile request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Profile request failed with status {}", status);
            return Err(AppError::Upstream(format!(
                "Profile request failed with status {}",
                status
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse profile response: {}", e)))?;

        Ok((profile.parse)(&body))
    }
}

impl Default for ProxyFetcher {
    fn default() -> Self {
        Self::new()
    }
}
