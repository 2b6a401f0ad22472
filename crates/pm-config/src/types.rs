use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub(crate) const CONFIG_VERSION: u32 = 2;

/// Top-level application configuration
///
/// Loaded from `settings.yaml` in the config directory. Missing sections fall
/// back to defaults, so a partial file (or no file at all) is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Config schema version
    #[serde(default = "default_version")]
    pub version: u32,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Per-provider credentials and overrides, keyed by provider name
    /// ("tiktok", "youtube", "instagram")
    #[serde(default)]
    pub providers: HashMap<String, ProviderSettings>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Where the admin browser is sent after a successful OAuth callback
    #[serde(default = "default_post_connect_redirect")]
    pub post_connect_redirect: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_post_connect_redirect() -> String {
    "/admin/social".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            post_connect_redirect: default_post_connect_redirect(),
        }
    }
}

/// Credentials and overrides for one provider
///
/// OAuth providers use `client_id` (sent as `client_key` for platforms that
/// name it that way), `client_secret`, and `redirect_uri`. Read-only
/// providers use `api_key` instead. `scopes` overrides the provider's
/// default scope list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.server.post_connect_redirect, "/admin/social");
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
providers:
  tiktok:
    client_id: abc
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.server.port, 8787);
        assert_eq!(
            config.providers.get("tiktok").unwrap().client_id.as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "youtube".to_string(),
            ProviderSettings {
                client_id: Some("cid".to_string()),
                client_secret: Some("secret".to_string()),
                redirect_uri: Some("http://localhost:8787/api/auth/youtube/callback".to_string()),
                api_key: None,
                scopes: None,
            },
        );

        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
