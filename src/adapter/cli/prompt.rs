use anyhow::Result;
use dialoguer::{Confirm as ConfirmPrompt, Select};

use crate::application::prompt::Confirm;
use crate::domain::model::AccountProfile;

/// Asks on the terminal. Anything but an explicit yes declines.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, title: &str, message: &str) -> bool {
        let answer = ConfirmPrompt::new()
            .with_prompt(format!("{}: {}", title, message))
            .default(false)
            .interact();

        match answer {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("Confirmation prompt failed, declining: {}", e);
                false
            }
        }
    }
}

/// Let the user pick one of several matching accounts
pub fn select_account(term: &str, mut candidates: Vec<AccountProfile>) -> Result<AccountProfile> {
    let labels: Vec<String> = candidates
        .iter()
        .map(|p| match &p.name {
            Some(name) => format!("{} <{}>", name, p.email),
            None => p.email.clone(),
        })
        .collect();

    let chosen = Select::new()
        .with_prompt(format!("Several accounts match '{}'", term))
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(candidates.swap_remove(chosen))
}
