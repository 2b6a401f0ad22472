//! Connection lifecycle types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a pending authorization attempt stays valid
pub const PKCE_SESSION_TTL_MINUTES: i64 = 10;

/// Ephemeral state for one in-flight authorization attempt
///
/// Created by the connect handler before the redirect is issued; consumed
/// (and deleted) by the callback handler. A callback whose `state` does not
/// match a stored, unexpired session is rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PkceSession {
    /// Anti-forgery token echoed back by the provider
    pub state: String,

    /// PKCE code verifier, never sent to the provider until the exchange
    pub code_verifier: String,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PkceSession {
    pub fn new(state: String, code_verifier: String) -> Self {
        let now = Utc::now();
        Self {
            state,
            code_verifier,
            created_at: now,
            expires_at: now + Duration::minutes(PKCE_SESSION_TTL_MINUTES),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Token material returned by a provider's token endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    /// Provider-assigned account identifier, when the token response carries
    /// one (TikTok's `open_id`)
    pub open_id: Option<String>,
    pub acquired_at: DateTime<Utc>,
}

/// Persisted credentials for one connected provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderCredentials {
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    pub acquired_at: DateTime<Utc>,
}

impl ProviderCredentials {
    /// Build a credential record from a token-endpoint response
    pub fn from_tokens(tokens: &OAuthTokens) -> Self {
        Self {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at: tokens.expires_at,
            scope: tokens.scope.clone(),
            display_name: None,
            account_id: tokens.open_id.clone(),
            acquired_at: tokens.acquired_at,
        }
    }

    /// A record with no expiry on file is treated as expired by policy
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => true,
        }
    }
}

/// Persisted per-provider document; exactly one lifecycle stage at a time
///
/// The connect handler writes `PendingAuth`; a successful callback replaces
/// it with `Connected`; disconnect deletes the document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ConnectionDocument {
    PendingAuth(PkceSession),
    Connected(ProviderCredentials),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(expires_at: Option<DateTime<Utc>>) -> ProviderCredentials {
        ProviderCredentials {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at,
            scope: None,
            display_name: None,
            account_id: None,
            acquired_at: Utc::now(),
        }
    }

    #[test]
    fn test_session_validity_window() {
        let session = PkceSession::new("state".to_string(), "verifier".to_string());

        assert!(!session.is_expired(Utc::now()));
        assert_eq!(
            session.expires_at - session.created_at,
            Duration::minutes(PKCE_SESSION_TTL_MINUTES)
        );
    }

    #[test]
    fn test_session_expiry() {
        let mut session = PkceSession::new("state".to_string(), "verifier".to_string());
        session.expires_at = Utc::now() - Duration::seconds(1);

        assert!(session.is_expired(Utc::now()));
    }

    #[test]
    fn test_credentials_future_expiry_not_expired() {
        let creds = credentials(Some(Utc::now() + Duration::hours(1)));
        assert!(!creds.is_expired(Utc::now()));
    }

    #[test]
    fn test_credentials_past_expiry_expired() {
        let creds = credentials(Some(Utc::now() - Duration::hours(1)));
        assert!(creds.is_expired(Utc::now()));
    }

    #[test]
    fn test_credentials_missing_expiry_is_expired() {
        let creds = credentials(None);
        assert!(creds.is_expired(Utc::now()));
    }

    #[test]
    fn test_document_stage_tagging() {
        let doc = ConnectionDocument::Connected(credentials(None));
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"stage\":\"connected\""));

        let doc = ConnectionDocument::PendingAuth(PkceSession::new(
            "state".to_string(),
            "verifier".to_string(),
        ));
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"stage\":\"pending_auth\""));
    }
}
