mod app_config;
pub mod loader;
pub mod paths;
mod settings;

pub use app_config::*;
pub use settings::UserSettings;

use std::sync::OnceLock;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Initialize configuration system (called at app startup)
pub fn init() {
    APP_CONFIG.get_or_init(loader::load_app_config);
    tracing::info!("Configuration initialized");
}

/// Get application configuration, loading it on first use
pub fn app() -> &'static AppConfig {
    APP_CONFIG.get_or_init(loader::load_app_config)
}
