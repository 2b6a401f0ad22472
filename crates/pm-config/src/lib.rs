//! Configuration management module
//!
//! Handles loading and accessing application configuration. Credentials may
//! be supplied either in `settings.yaml` or through `PAWME_*` environment
//! variables; the environment wins.

use parking_lot::RwLock;
use pm_types::AppResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub mod paths;
mod storage;
pub mod types;

pub use storage::{load_config, save_config};
pub use types::*;

const ENV_PREFIX: &str = "PAWME_";

/// Per-provider fields that can be overridden from the environment, as
/// `PAWME_<PROVIDER>_<FIELD>` (e.g. `PAWME_TIKTOK_CLIENT_ID`)
const ENV_FIELDS: [&str; 4] = ["CLIENT_ID", "CLIENT_SECRET", "REDIRECT_URI", "API_KEY"];

/// Thread-safe configuration manager
///
/// Constructed once at startup and shared via `Arc`; handlers read through
/// it instead of any process-global state.
#[derive(Debug)]
pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager from an already-loaded config
    pub fn new(config: AppConfig, config_path: PathBuf) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        }
    }

    /// Load configuration from the default location
    pub async fn load() -> AppResult<Self> {
        let config_path = paths::config_file()?;
        Self::load_from_path(config_path).await
    }

    /// Load configuration from a specific path
    ///
    /// On first run (file absent) the default configuration is written out so
    /// the admin has a file to edit. Environment overrides are applied after
    /// loading.
    pub async fn load_from_path(path: PathBuf) -> AppResult<Self> {
        let existed = path.exists();
        let mut config = storage::load_config(&path).await?;

        if !existed {
            storage::save_config(&path, &config).await?;
            info!("Created default configuration at {}", path.display());
        }

        apply_env_overrides(&mut config);

        Ok(Self::new(config, path))
    }

    /// Get a snapshot of the current configuration
    pub fn get(&self) -> AppConfig {
        self.config.read().clone()
    }

    /// Get the settings for one provider, if any are configured
    pub fn provider(&self, name: &str) -> Option<ProviderSettings> {
        self.config.read().providers.get(name).cloned()
    }

    /// Path the configuration was loaded from
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Overlay `PAWME_<PROVIDER>_<FIELD>` environment variables onto the config
///
/// Unknown provider names are accepted here; the registry decides at request
/// time whether a provider actually exists.
fn apply_env_overrides(config: &mut AppConfig) {
    for (key, value) in std::env::vars() {
        let Some(rest) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };

        for field in ENV_FIELDS {
            let suffix = format!("_{}", field);
            let Some(name) = rest.strip_suffix(suffix.as_str()) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }

            let entry = config
                .providers
                .entry(name.to_ascii_lowercase())
                .or_default();
            match field {
                "CLIENT_ID" => entry.client_id = Some(value.clone()),
                "CLIENT_SECRET" => entry.client_secret = Some(value.clone()),
                "REDIRECT_URI" => entry.redirect_uri = Some(value.clone()),
                "API_KEY" => entry.api_key = Some(value.clone()),
                _ => unreachable!(),
            }
            break;
        }
    }
}
