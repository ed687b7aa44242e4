//! Configuration commands.

use anyhow::Result;
use clap::Subcommand;

use crate::infrastructure::config::{loader, paths, AccountSettings, AppConfig, UserSettings};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the path of settings.yaml
    Path,

    /// Print the effective configuration
    Show,

    /// Write the acting account into settings.yaml
    SetAccount {
        /// Account id
        #[arg(long)]
        id: String,
        /// Account email
        #[arg(long)]
        email: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
    },
}

pub fn execute(cmd: &ConfigCommands, config: &AppConfig) -> Result<()> {
    match cmd {
        ConfigCommands::Path => println!("{}", paths::settings_file_path().display()),
        ConfigCommands::Show => print!("{}", serde_yaml::to_string(&redacted(config))?),
        ConfigCommands::SetAccount { id, email, name } => {
            let mut settings: UserSettings = loader::load_user_settings();
            settings.account = Some(AccountSettings {
                id: id.clone(),
                email: email.clone(),
                name: name.clone(),
            });
            loader::save_user_settings(&settings)?;
            println!("Saved to {}", paths::settings_file_path().display());
        }
    }
    Ok(())
}

/// Copy of `config` with secrets masked for display
fn redacted(config: &AppConfig) -> AppConfig {
    let mut shown = config.clone();
    let rest = &mut shown.storage.rest;
    if !rest.api_key.is_empty() {
        rest.api_key = "***".to_string();
    }
    if rest.access_token.is_some() {
        rest.access_token = Some("***".to_string());
    }
    shown
}
