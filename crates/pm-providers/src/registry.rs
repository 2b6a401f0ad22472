//! Provider descriptor table

use std::collections::HashMap;

/// Profile fields captured onto the credential record after a successful
/// connect
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFields {
    pub display_name: Option<String>,
    pub account_id: Option<String>,
}

/// Where and how to fetch profile fields for a freshly connected account
#[derive(Debug, Clone, Copy)]
pub struct ProfileSpec {
    pub url: &'static str,
    /// Extracts the fields from the provider's response body
    pub parse: fn(&serde_json::Value) -> ProfileFields,
}

/// OAuth endpoints and parameters for a provider
#[derive(Debug, Clone, Copy)]
pub struct OAuthEndpoints {
    pub authorize_url: &'static str,
    pub token_url: &'static str,
    /// The provider's name for the client identifier parameter
    /// ("client_id" for most platforms, "client_key" for TikTok)
    pub client_param: &'static str,
    pub default_scopes: &'static [&'static str],
    pub profile: Option<ProfileSpec>,
}

/// How a provider authenticates downstream API calls
#[derive(Debug, Clone, Copy)]
pub enum ProviderAuth {
    /// Authorization-code flow with PKCE; proxy calls carry a Bearer token
    OAuth(OAuthEndpoints),
    /// Read-only platform; a configured API key is sent as a query parameter
    ApiKey { query_param: &'static str },
}

/// Static descriptor for one provider
#[derive(Debug, Clone, Copy)]
pub struct ProviderSpec {
    pub name: &'static str,
    pub display_name: &'static str,
    pub auth: ProviderAuth,
    /// Proxy endpoint selectors and the provider URLs they map to
    pub endpoints: &'static [(&'static str, &'static str)],
}

impl ProviderSpec {
    /// Resolve a proxy endpoint selector ("stats", "videos", "posts")
    pub fn endpoint_url(&self, selector: &str) -> Option<&'static str> {
        self.endpoints
            .iter()
            .find(|(name, _)| *name == selector)
            .map(|(_, url)| *url)
    }

    /// The OAuth endpoints, when this provider uses the connect flow
    pub fn oauth(&self) -> Option<&OAuthEndpoints> {
        match &self.auth {
            ProviderAuth::OAuth(endpoints) => Some(endpoints),
            ProviderAuth::ApiKey { .. } => None,
        }
    }
}

/// Lookup table of all supported providers
pub struct ProviderRegistry {
    providers: HashMap<&'static str, ProviderSpec>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        let mut providers = HashMap::new();
        for spec in [
            crate::tiktok::spec(),
            crate::youtube::spec(),
            crate::instagram::spec(),
        ] {
            providers.insert(spec.name, spec);
        }
        Self { providers }
    }

    pub fn get(&self, name: &str) -> Option<&ProviderSpec> {
        self.providers.get(name)
    }

    /// Provider names, sorted for stable log output
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.providers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
