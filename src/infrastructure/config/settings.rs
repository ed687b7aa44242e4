use serde::{Deserialize, Serialize};

use super::app_config::{AccountSettings, AppConfig, LoggingConfig, StorageSettings};

/// User settings stored in settings.yaml in user config directory.
/// All fields are optional - missing sections keep the embedded defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserSettings {
    pub storage: Option<StorageSettings>,
    pub logging: Option<LoggingConfig>,
    pub account: Option<AccountSettings>,
}

impl UserSettings {
    /// Overlay these settings on `config`, section by section.
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(storage) = self.storage {
            config.storage = storage;
        }
        if let Some(logging) = self.logging {
            config.logging = logging;
        }
        if self.account.is_some() {
            config.account = self.account;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::{loader, StorageType};

    #[test]
    fn test_apply_overrides_only_present_sections() {
        let mut config = AppConfig::default();
        config.logging.production = true;

        let settings: UserSettings = loader::parse_yaml(
            "storage:\n  type: rest\n  rest:\n    base_url: https://example.supabase.co\n    api_key: anon\n",
        )
        .unwrap();
        settings.apply(&mut config);

        assert_eq!(config.storage.storage_type, StorageType::Rest);
        assert_eq!(config.storage.rest.base_url, "https://example.supabase.co");
        assert_eq!(config.storage.rest.timeout_sec, 15);
        assert_eq!(config.storage.mongodb.database, "remindly");
        assert!(config.logging.production);
    }
}
