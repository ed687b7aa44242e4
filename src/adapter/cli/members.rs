//! Membership commands.

use anyhow::{bail, Result};
use clap::Subcommand;

use super::groups::{open_group, pick_candidate};
use super::output;
use crate::adapter::state::AppState;

#[derive(Subcommand)]
pub enum MemberCommands {
    /// Add an account to a group
    Add {
        /// Group id
        group: String,
        /// Email or name of the account
        account: String,
    },

    /// Remove a member from a group
    Remove {
        /// Group id
        group: String,
        /// Membership id or member email
        member: String,
    },
}

pub async fn execute(cmd: MemberCommands, state: &AppState, interactive: bool) -> Result<()> {
    let mut service = state.group_service()?;

    match cmd {
        MemberCommands::Add { group, account } => {
            open_group(&mut service, &group).await?;
            let candidate = pick_candidate(&service, &account, interactive).await?;
            service.choose_member(Some(candidate));
            service.add_member().await?;
            output::print_members(service.session().members());
        }
        MemberCommands::Remove { group, member } => {
            open_group(&mut service, &group).await?;
            let Some(target) = service
                .session()
                .members()
                .iter()
                .find(|m| m.id.as_str() == member || m.email.eq_ignore_ascii_case(&member))
                .map(|m| m.id.clone())
            else {
                bail!("'{}' is not a member of this group", member);
            };

            if service.remove_member(&target).await? {
                output::print_members(service.session().members());
            } else {
                println!("Cancelled");
            }
        }
    }

    Ok(())
}
