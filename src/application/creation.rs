//! Two-phase group creation state machine.
//!
//! Phase 1 collects the group details and is committed by the service; phase 2
//! stages prospective members in memory until they are committed or skipped.
//! This type only tracks transitions; all store calls live in the service.

use serde::Serialize;

use super::staging::MemberStaging;
use crate::domain::error::DomainError;
use crate::domain::model::{AccountId, AccountProfile, GroupId, NewGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CreationStep {
    #[default]
    Idle,
    Details,
    Members,
}

/// What a close request (dialog dismissed) resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseAction {
    /// Nothing was in progress
    Ignored,
    /// Details were discarded, nothing had been written
    Cancelled,
    /// The group already exists, so the close must run the finish path
    Finish(GroupId),
}

#[derive(Debug, Default)]
pub struct CreationWorkflow {
    step: CreationStep,
    name: String,
    description: String,
    staging: MemberStaging,
    created_group: Option<GroupId>,
}

impl CreationWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> CreationStep {
        self.step
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_group(&self) -> Option<&GroupId> {
        self.created_group.as_ref()
    }

    pub fn staged(&self) -> &[AccountProfile] {
        self.staging.pending()
    }

    pub fn is_staged(&self, id: &AccountId) -> bool {
        self.staging.contains(id)
    }

    /// Open the details step. Re-entering while already in progress keeps the
    /// current input.
    pub fn begin(&mut self) {
        if self.step == CreationStep::Idle {
            self.step = CreationStep::Details;
        }
    }

    pub fn set_details(&mut self, name: &str, description: &str) -> Result<(), DomainError> {
        self.expect_step(CreationStep::Details)?;
        self.name = name.to_string();
        self.description = description.to_string();
        Ok(())
    }

    /// Phase 1 insert payload. `Ok(None)` when the trimmed name is empty.
    pub fn group_to_create(&self, created_by: AccountId) -> Result<Option<NewGroup>, DomainError> {
        self.expect_step(CreationStep::Details)?;
        Ok(NewGroup::from_input(&self.name, &self.description, created_by))
    }

    /// Record a successful phase 1 commit and move on to member staging.
    pub fn group_created(&mut self, group_id: GroupId) -> Result<(), DomainError> {
        self.expect_step(CreationStep::Details)?;
        self.created_group = Some(group_id);
        self.step = CreationStep::Members;
        Ok(())
    }

    pub fn stage(&mut self, candidate: AccountProfile) -> Result<bool, DomainError> {
        self.expect_step(CreationStep::Members)?;
        Ok(self.staging.stage(candidate))
    }

    pub fn unstage(&mut self, id: &AccountId) -> Result<bool, DomainError> {
        self.expect_step(CreationStep::Members)?;
        Ok(self.staging.unstage(id))
    }

    pub fn request_close(&mut self) -> CloseAction {
        match self.step {
            CreationStep::Idle => CloseAction::Ignored,
            CreationStep::Details => {
                self.reset();
                CloseAction::Cancelled
            }
            CreationStep::Members => match &self.created_group {
                Some(id) => CloseAction::Finish(id.clone()),
                None => {
                    self.reset();
                    CloseAction::Cancelled
                }
            },
        }
    }

    /// Leave the members step, clearing all transient state. Returns the
    /// group created in phase 1.
    pub fn finish(&mut self) -> Result<GroupId, DomainError> {
        self.expect_step(CreationStep::Members)?;
        let group_id = self
            .created_group
            .take()
            .ok_or_else(|| DomainError::Validation("no group was created".to_string()))?;
        self.reset();
        Ok(group_id)
    }

    fn reset(&mut self) {
        self.step = CreationStep::Idle;
        self.name.clear();
        self.description.clear();
        self.staging.clear();
        self.created_group = None;
    }

    fn expect_step(&self, expected: CreationStep) -> Result<(), DomainError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "group creation is in step {:?}, expected {:?}",
                self.step, expected
            )))
        }
    }
}
