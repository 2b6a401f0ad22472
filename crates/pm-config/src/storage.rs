//! Configuration file load/save

use crate::types::{AppConfig, CONFIG_VERSION};
use pm_types::{AppError, AppResult};
use std::path::Path;
use tokio::fs;

/// Load configuration from a YAML file
///
/// A missing file is not an error; defaults are returned so a fresh install
/// works without any setup.
pub async fn load_config(path: &Path) -> AppResult<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

    let config: AppConfig = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    if config.version > CONFIG_VERSION {
        return Err(AppError::Config(format!(
            "Configuration version {} is newer than supported version {}",
            config.version, CONFIG_VERSION
        )));
    }

    Ok(config)
}

/// Save configuration to a YAML file, creating parent directories as needed
pub async fn save_config(path: &Path, config: &AppConfig) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(|e| {
            AppError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    let content = serde_yaml::to_string(config)
        .map_err(|e| AppError::Config(format!("Failed to serialize configuration: {}", e)))?;

    fs::write(path, content)
        .await
        .map_err(|e| AppError::Config(format!("Failed to write {}: {}", path.display(), e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderSettings;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.yaml");

        let config = load_config(&path).await.unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.yaml");

        let mut config = AppConfig::default();
        config.providers.insert(
            "tiktok".to_string(),
            ProviderSettings {
                client_id: Some("tk-client".to_string()),
                ..Default::default()
            },
        );

        save_config(&path, &config).await.unwrap();
        let loaded = load_config(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_load_rejects_newer_version() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        tokio::fs::write(&path, "version: 99\n").await.unwrap();

        let result = load_config(&path).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        tokio::fs::write(&path, "server: [not a map").await.unwrap();

        let result = load_config(&path).await;
        assert!(result.is_err());
    }
}
