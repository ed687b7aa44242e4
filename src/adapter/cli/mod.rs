//! Command line surface over the group service.

use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};

pub mod accounts;
pub mod groups;
pub mod members;
mod output;
mod prompt;
pub mod reminders;
pub mod settings;

use crate::adapter::events;
use crate::adapter::state::AppState;
use crate::application::eventbus::create_event_bus;
use crate::application::prompt::{FixedAnswer, SharedConfirm};
use crate::domain::model::AccountProfile;
use crate::infrastructure::config::{paths, AppConfig};
use crate::infrastructure::storage;

/// Remindly - shared reminder groups
#[derive(Parser)]
#[command(name = "remindly")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Account to act as (defaults to `account` in settings.yaml)
    #[arg(long = "as", global = true, env = "REMINDLY_ACCOUNT")]
    pub account_id: Option<String>,

    /// Email of the acting account
    #[arg(long, global = true, env = "REMINDLY_EMAIL")]
    pub email: Option<String>,

    /// Display name of the acting account
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List, show, create and leave groups
    #[command(subcommand)]
    Groups(groups::GroupCommands),

    /// Add and remove group members
    #[command(subcommand)]
    Members(members::MemberCommands),

    /// Manage group reminders
    #[command(subcommand)]
    Reminders(reminders::ReminderCommands),

    /// Account directory
    #[command(subcommand)]
    Accounts(accounts::AccountCommands),

    /// Configuration files
    #[command(subcommand)]
    Config(settings::ConfigCommands),
}

impl Cli {
    /// Run the command.
    ///
    /// `Ok(ExitCode::FAILURE)` means the failure was already shown to the
    /// user through an alert.
    pub async fn execute(self, config: &AppConfig) -> Result<ExitCode> {
        let account = match &self.command {
            Commands::Config(cmd) => {
                settings::execute(cmd, config)?;
                return Ok(ExitCode::SUCCESS);
            }
            Commands::Accounts(accounts::AccountCommands::Add(args)) => {
                let backend = storage::init_storage(&config.storage).await?;
                accounts::register(args, backend.profiles).await?;
                return Ok(ExitCode::SUCCESS);
            }
            _ => self.acting_account(config)?,
        };

        let backend = storage::init_storage(&config.storage).await?;
        let interactive = !self.yes && std::io::stdin().is_terminal();
        let confirm: SharedConfirm = if self.yes {
            Arc::new(FixedAnswer(true))
        } else {
            Arc::new(prompt::TerminalConfirm)
        };

        let event_bus = create_event_bus();
        let forwarder = events::start_event_forwarder(event_bus.clone());
        let state = AppState::new(backend, confirm, event_bus, account);

        let result = match self.command {
            Commands::Groups(cmd) => groups::execute(cmd, &state, interactive).await,
            Commands::Members(cmd) => members::execute(cmd, &state, interactive).await,
            Commands::Reminders(cmd) => reminders::execute(cmd, &state).await,
            Commands::Accounts(cmd) => accounts::execute(cmd, &state).await,
            Commands::Config(_) => Ok(()),
        };

        // Dropping the last sender lets the forwarder drain and stop
        drop(state);
        let alerts = forwarder.await.unwrap_or_else(|e| {
            tracing::warn!("Event forwarder failed: {}", e);
            0
        });

        match result {
            Ok(()) => Ok(ExitCode::SUCCESS),
            Err(_) if alerts > 0 => Ok(ExitCode::FAILURE),
            Err(e) => Err(e),
        }
    }

    fn acting_account(&self, config: &AppConfig) -> Result<AccountProfile> {
        match (&self.account_id, &self.email) {
            (Some(id), Some(email)) => Ok(AccountProfile::new(
                id.as_str(),
                email.as_str(),
                self.name.as_deref(),
            )),
            (Some(_), None) | (None, Some(_)) => bail!("--as and --email must be given together"),
            (None, None) => config
                .account
                .as_ref()
                .map(|a| AccountProfile::new(a.id.as_str(), a.email.as_str(), a.name.as_deref()))
                .ok_or_else(|| {
                    anyhow!(
                        "No account to act as. Pass --as and --email, or set `account` in {}",
                        paths::settings_file_path().display()
                    )
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::AccountSettings;

    #[test]
    fn test_parses_create_with_members() {
        let cli = Cli::try_parse_from([
            "remindly",
            "--as",
            "u1",
            "--email",
            "me@x.com",
            "groups",
            "create",
            "--name",
            "Study Group",
            "--member",
            "a@x.com",
            "--member",
            "b@x.com",
        ])
        .unwrap();

        match cli.command {
            Commands::Groups(groups::GroupCommands::Create(args)) => {
                assert_eq!(args.name, "Study Group");
                assert_eq!(args.member, vec!["a@x.com", "b@x.com"]);
                assert!(!args.skip_members);
            }
            _ => panic!("expected groups create"),
        }
    }

    #[test]
    fn test_acting_account_from_flags_or_config() {
        let cli = Cli::try_parse_from(["remindly", "--as", "u1", "--email", "me@x.com", "groups", "list"])
            .unwrap();
        let account = cli.acting_account(&AppConfig::default()).unwrap();
        assert_eq!(account.id.as_str(), "u1");

        let cli = Cli::try_parse_from(["remindly", "groups", "list"]).unwrap();
        assert!(cli.acting_account(&AppConfig::default()).is_err());

        let config = AppConfig {
            account: Some(AccountSettings {
                id: "u2".to_string(),
                email: "you@x.com".to_string(),
                name: None,
            }),
            ..Default::default()
        };
        assert_eq!(cli.acting_account(&config).unwrap().email, "you@x.com");

        let cli = Cli::try_parse_from(["remindly", "--as", "u1", "groups", "list"]).unwrap();
        assert!(cli.acting_account(&config).is_err());
    }

    #[test]
    fn test_rejects_bad_reminder_time() {
        let parsed = Cli::try_parse_from([
            "remindly", "reminders", "add", "g1", "--title", "Walk", "--at", "25:00",
        ]);
        assert!(parsed.is_err());
    }
}
