//! Group commands.

use anyhow::{anyhow, bail, Result};
use clap::{Args, Subcommand};

use super::{output, prompt};
use crate::adapter::state::{AppState, DynGroupService};
use crate::domain::error::DomainError;
use crate::domain::model::{AccountProfile, GroupId};

#[derive(Subcommand)]
pub enum GroupCommands {
    /// List the groups you belong to
    List,

    /// Show members and reminders of a group
    Show {
        /// Group id
        group: String,
    },

    /// Create a group, optionally adding members
    Create(CreateGroupArgs),

    /// Leave a group
    Leave {
        /// Group id
        group: String,
    },
}

#[derive(Args)]
pub struct CreateGroupArgs {
    /// Group name
    #[arg(short, long)]
    pub name: String,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Email or name of an account to add (repeatable)
    #[arg(short, long)]
    pub member: Vec<String>,

    /// Create the group without adding the given members
    #[arg(long)]
    pub skip_members: bool,
}

pub async fn execute(cmd: GroupCommands, state: &AppState, interactive: bool) -> Result<()> {
    let mut service = state.group_service()?;

    match cmd {
        GroupCommands::List => {
            if !service.refresh_groups().await {
                bail!("Could not load your groups");
            }
            output::print_groups(service.session().groups());
        }
        GroupCommands::Show { group } => {
            open_group(&mut service, &group).await?;
            output::print_group_detail(service.session());
        }
        GroupCommands::Create(args) => {
            create(&mut service, args, interactive).await?;
        }
        GroupCommands::Leave { group } => {
            let group_id = open_group(&mut service, &group).await?;
            if !service.leave_group(&group_id).await? {
                println!("Cancelled");
            }
        }
    }

    Ok(())
}

async fn create(
    service: &mut DynGroupService,
    args: CreateGroupArgs,
    interactive: bool,
) -> Result<()> {
    // Resolve every term first so a typo does not leave a half-built group
    let mut candidates = Vec::new();
    for term in &args.member {
        candidates.push(pick_candidate(service, term, interactive).await?);
    }

    service.start_group_creation();
    service.set_group_details(&args.name, args.description.as_deref().unwrap_or(""))?;
    if service.create_group().await?.is_none() {
        bail!("Group name cannot be empty");
    }

    for candidate in candidates {
        service.stage_member(candidate)?;
    }

    if args.skip_members || service.creation().staged().is_empty() {
        service.skip_members().await?;
    } else {
        let report = service.commit_members().await?;
        for (id, reason) in &report.failed {
            tracing::debug!("Staged member {} not added: {}", id, reason);
        }
    }

    output::print_group_detail(service.session());
    Ok(())
}

/// Load the caller's groups and select `group`.
pub(super) async fn open_group(service: &mut DynGroupService, group: &str) -> Result<GroupId> {
    if !service.refresh_groups().await {
        bail!("Could not load your groups");
    }

    let group_id = GroupId::from(group);
    if service.session().group(&group_id).is_none() {
        return Err(DomainError::NotFound(format!("Group {}", group_id)).into());
    }

    service.select_group(Some(group_id.clone())).await;
    Ok(group_id)
}

/// Resolve a search term to one account.
///
/// An exact email match wins. Several matches prompt for a choice when
/// running interactively.
pub(super) async fn pick_candidate(
    service: &DynGroupService,
    term: &str,
    interactive: bool,
) -> Result<AccountProfile> {
    let mut found = service.search_accounts(term).await?;

    if let Some(pos) = found
        .iter()
        .position(|p| p.email.eq_ignore_ascii_case(term.trim()))
    {
        return Ok(found.swap_remove(pos));
    }

    match found.len() {
        0 => Err(anyhow!("No account matches '{}'", term)),
        1 => Ok(found.swap_remove(0)),
        n if interactive => prompt::select_account(term, found)
            .map_err(|e| anyhow!("No account chosen for '{}' ({} matches): {}", term, n, e)),
        n => bail!("'{}' matches {} accounts, use the full email", term, n),
    }
}
