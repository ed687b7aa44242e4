//! Group reminder commands.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use super::groups::open_group;
use super::output;
use crate::adapter::state::AppState;
use crate::domain::model::{ReminderDraft, ReminderId, Repeat, TimeOfDay};

#[derive(Subcommand)]
pub enum ReminderCommands {
    /// List the reminders of a group
    List {
        /// Group id
        group: String,
    },

    /// Add a reminder to a group
    Add(AddReminderArgs),

    /// Delete a reminder
    Delete {
        /// Group id
        group: String,
        /// Reminder id
        reminder: String,
    },
}

#[derive(Args)]
pub struct AddReminderArgs {
    /// Group id
    pub group: String,

    /// What to be reminded of
    #[arg(short, long)]
    pub title: String,

    /// Time of day, HH:MM
    #[arg(long)]
    pub at: TimeOfDay,

    /// once, daily or weekly
    #[arg(short, long, default_value = "once")]
    pub repeat: Repeat,

    /// Why it matters
    #[arg(short, long)]
    pub why: Option<String>,
}

pub async fn execute(cmd: ReminderCommands, state: &AppState) -> Result<()> {
    let mut service = state.group_service()?;

    match cmd {
        ReminderCommands::List { group } => {
            open_group(&mut service, &group).await?;
        }
        ReminderCommands::Add(args) => {
            open_group(&mut service, &args.group).await?;
            *service.reminder_form_mut() = ReminderDraft {
                title: args.title,
                why: args.why.unwrap_or_default(),
                time: Some(args.at),
                repeat: args.repeat,
            };
            if service.create_reminder().await?.is_none() {
                bail!("Reminder title cannot be empty");
            }
        }
        ReminderCommands::Delete { group, reminder } => {
            open_group(&mut service, &group).await?;
            if !service.delete_reminder(&ReminderId::from(reminder)).await? {
                println!("Cancelled");
                return Ok(());
            }
        }
    }

    output::print_reminders(service.session().reminders());
    Ok(())
}
