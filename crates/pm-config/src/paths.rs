//! OS-specific path resolution for configuration and state files

use pm_types::{AppError, AppResult};
use std::path::PathBuf;

/// Get the configuration directory
///
/// Priority:
/// 1. Runtime override via `PAWME_ENV` environment variable: `~/.pawme-{env}/`
/// 2. Development mode (debug builds): `~/.pawme-dev/`
/// 3. Production mode (release builds): `~/.pawme/`
pub fn config_dir() -> AppResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AppError::Config("Could not determine home directory".to_string()))?;

    // Runtime override via environment variable (for testing)
    if let Ok(env_suffix) = std::env::var("PAWME_ENV") {
        return Ok(home.join(format!(".pawme-{}", env_suffix)));
    }

    #[cfg(debug_assertions)]
    let dir = home.join(".pawme-dev");

    #[cfg(not(debug_assertions))]
    let dir = home.join(".pawme");

    Ok(dir)
}

/// Get the configuration file path
pub fn config_file() -> AppResult<PathBuf> {
    Ok(config_dir()?.join("settings.yaml"))
}

/// Get the provider connection store file path
pub fn connections_file() -> AppResult<PathBuf> {
    Ok(config_dir()?.join("connections.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir_exists(path: &PathBuf) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial(pawme_env)]
    fn test_config_dir() {
        env::remove_var("PAWME_ENV");

        let dir = config_dir().unwrap();
        assert!(!dir.as_os_str().is_empty());

        #[cfg(debug_assertions)]
        assert!(dir.to_string_lossy().ends_with(".pawme-dev"));

        #[cfg(not(debug_assertions))]
        assert!(dir.to_string_lossy().ends_with(".pawme"));
    }

    #[test]
    #[serial(pawme_env)]
    fn test_config_dir_with_env_override() {
        env::set_var("PAWME_ENV", "test");

        let dir = config_dir().unwrap();
        assert!(
            dir.to_string_lossy().ends_with(".pawme-test"),
            "Expected path to end with .pawme-test, got: {}",
            dir.display()
        );

        env::remove_var("PAWME_ENV");
    }

    #[test]
    fn test_config_file() {
        let file = config_file().unwrap();
        assert!(file.to_string_lossy().ends_with("settings.yaml"));
    }

    #[test]
    fn test_connections_file() {
        let file = connections_file().unwrap();
        assert!(file.to_string_lossy().ends_with("connections.json"));
    }
}
