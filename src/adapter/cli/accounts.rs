//! Account directory commands.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use super::output;
use crate::adapter::state::AppState;
use crate::domain::model::{AccountId, AccountProfile};
use crate::domain::repository::ProfileRegistry;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Search accounts by email or name
    Search {
        /// Part of an email or display name
        term: String,
    },

    /// Register an account in a local store
    Add(AddAccountArgs),
}

#[derive(Args)]
pub struct AddAccountArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,

    /// Display name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Account id (generated when omitted)
    #[arg(long)]
    pub id: Option<String>,
}

pub async fn execute(cmd: AccountCommands, state: &AppState) -> Result<()> {
    match cmd {
        AccountCommands::Search { term } => {
            let service = state.group_service()?;
            let found = service.search_accounts(&term).await?;
            output::print_accounts(&found);
        }
        AccountCommands::Add(args) => register(&args, state.profiles.clone()).await?,
    }
    Ok(())
}

pub async fn register(
    args: &AddAccountArgs,
    profiles: Option<Arc<dyn ProfileRegistry>>,
) -> Result<()> {
    let profiles = profiles
        .ok_or_else(|| anyhow!("This store manages accounts itself; sign up through the app"))?;

    let email = args.email.trim();
    if email.is_empty() {
        return Err(anyhow!("Email cannot be empty"));
    }

    let id = match &args.id {
        Some(id) => AccountId::from(id.as_str()),
        None => AccountId::generate(),
    };
    let profile = AccountProfile::new(id, email, args.name.as_deref());
    profiles.save_profile(&profile).await?;

    tracing::info!("Registered account {} ({})", profile.email, profile.id);
    println!("{}", profile.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::AccountDirectory;
    use crate::infrastructure::persistence::memory::MemoryStore;

    #[tokio::test]
    async fn test_register_generates_id() {
        let store = Arc::new(MemoryStore::new());
        let args = AddAccountArgs {
            email: " ann@x.com ".to_string(),
            name: Some("Ann".to_string()),
            id: None,
        };

        let registry: Arc<dyn ProfileRegistry> = store.clone();
        register(&args, Some(registry)).await.unwrap();

        let found = store.search_accounts("ann", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "ann@x.com");
        assert!(!found[0].id.as_str().is_empty());
    }

    #[tokio::test]
    async fn test_register_needs_a_registry() {
        let args = AddAccountArgs {
            email: "ann@x.com".to_string(),
            name: None,
            id: None,
        };
        assert!(register(&args, None).await.is_err());
    }
}
