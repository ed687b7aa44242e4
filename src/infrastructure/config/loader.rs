use include_dir::{include_dir, Dir};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use super::app_config::AppConfig;
use super::paths::{config_dir, settings_file_path};
use super::settings::UserSettings;

// Embed the entire configs directory at compile time
static CONFIGS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/resources/configs");

/// Load a YAML configuration file from disk
pub fn load_yaml<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)?;
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Parse YAML from string
pub fn parse_yaml<T: DeserializeOwned>(content: &str) -> anyhow::Result<T> {
    let config: T = serde_yaml::from_str(content)?;
    Ok(config)
}

/// Save a configuration to a YAML file
pub fn save_yaml<T: Serialize>(path: impl AsRef<Path>, config: &T) -> anyhow::Result<()> {
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load embedded configuration by name from the configs directory
pub fn load_embedded_config<T: DeserializeOwned + Default>(name: &str) -> T {
    let file_name = format!("{}.yaml", name);

    let Some(file) = CONFIGS_DIR.get_file(&file_name) else {
        tracing::warn!("Embedded config {} not found, using defaults", name);
        return T::default();
    };
    let Some(content) = file.contents_utf8() else {
        tracing::error!("Embedded config {} is not valid UTF-8", name);
        return T::default();
    };

    match parse_yaml::<T>(content) {
        Ok(config) => {
            tracing::debug!("Loaded embedded config: {}", name);
            config
        }
        Err(e) => {
            tracing::error!("Failed to parse embedded config {}: {}", name, e);
            T::default()
        }
    }
}

/// Embedded app.yaml with the user's settings.yaml laid over it
pub fn load_app_config() -> AppConfig {
    let mut config: AppConfig = load_embedded_config("app");
    load_user_settings().apply(&mut config);
    config
}

/// Load user settings from settings.yaml in user config directory
/// Returns default settings if file doesn't exist or is invalid
pub fn load_user_settings() -> UserSettings {
    let settings_path = settings_file_path();

    if settings_path.exists() {
        match load_yaml::<UserSettings>(&settings_path) {
            Ok(settings) => {
                tracing::info!("Loaded user settings from {:?}", settings_path);
                return settings;
            }
            Err(e) => {
                tracing::warn!("Failed to parse settings.yaml: {}, using defaults", e);
            }
        }
    } else {
        tracing::debug!("No settings.yaml found, using defaults");
    }

    UserSettings::default()
}

/// Save user settings to settings.yaml in user config directory
pub fn save_user_settings(settings: &UserSettings) -> anyhow::Result<()> {
    ensure_config_dir()?;
    let settings_path = settings_file_path();
    save_yaml(&settings_path, settings)?;
    tracing::info!("Saved user settings to {:?}", settings_path);
    Ok(())
}

/// Ensure user config directory exists
pub fn ensure_config_dir() -> std::io::Result<()> {
    let dir = config_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::StorageType;

    #[test]
    fn test_embedded_app_config_parses() {
        let config: AppConfig = load_embedded_config("app");
        assert_eq!(config.storage.storage_type, StorageType::Sqlite);
        assert!(config.storage.sqlite.path.is_empty());
        assert_eq!(config.storage.rest.timeout_sec, 15);
        assert!(!config.logging.production);
    }

    #[test]
    fn test_missing_embedded_config_falls_back_to_default() {
        let config: AppConfig = load_embedded_config("does-not-exist");
        assert_eq!(config.storage.storage_type, StorageType::Sqlite);
    }

    #[test]
    fn test_yaml_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("remindly-cfg-{}", ulid::Ulid::new()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.yaml");

        let settings: UserSettings =
            parse_yaml("account:\n  id: u1\n  email: ann@example.com\n").unwrap();
        save_yaml(&path, &settings).unwrap();
        let loaded: UserSettings = load_yaml(&path).unwrap();

        let account = loaded.account.unwrap();
        assert_eq!(account.email, "ann@example.com");
        assert!(account.name.is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
