use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSettings,
    pub logging: LoggingConfig,
    /// Signed-in account used when no account is given on the command line
    pub account: Option<AccountSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Storage backend: "sqlite" (default), "rest", "mongodb" or "memory"
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    pub sqlite: SqliteConfig,
    pub rest: RestSettings,
    pub mongodb: MongoDbSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Sqlite,
    Rest,
    Mongodb,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SqliteConfig {
    /// Leave empty to use platform default path
    #[serde(default)]
    pub path: String,
}

impl SqliteConfig {
    pub fn effective_path(&self) -> PathBuf {
        if self.path.is_empty() {
            paths::default_sqlite_path()
        } else {
            PathBuf::from(&self.path)
        }
    }
}

/// Hosted store reached over REST
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestSettings {
    /// Project URL, e.g. https://xyz.supabase.co
    #[serde(default)]
    pub base_url: String,

    /// Public (anon) API key
    #[serde(default)]
    pub api_key: String,

    /// Session token from the auth collaborator; the API key is sent when absent
    #[serde(default)]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

fn default_timeout_sec() -> u64 {
    15
}

impl Default for RestSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            access_token: None,
            timeout_sec: default_timeout_sec(),
        }
    }
}

impl RestSettings {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoDbSettings {
    pub uri: String,
    pub database: String,
}

impl Default for MongoDbSettings {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "remindly".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write a daily log file and log at info level
    pub production: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSettings {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}
