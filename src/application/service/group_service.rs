use std::sync::Arc;

use serde::Serialize;

use crate::application::creation::{CloseAction, CreationStep, CreationWorkflow};
use crate::application::eventbus::SharedEventBus;
use crate::application::prompt::SharedConfirm;
use crate::application::session::GroupSession;
use crate::domain::error::DomainError;
use crate::domain::event::DomainEvent;
use crate::domain::model::{AccountId, AccountProfile, GroupId, NewMembership, Role};
use crate::domain::repository::{AccountDirectory, GroupStore, Result};

/// Maximum number of directory results offered to the user
pub const SEARCH_LIMIT: usize = 10;

/// Outcome of committing the staged members of a new group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitReport {
    pub attempted: usize,
    pub added: Vec<AccountId>,
    pub failed: Vec<(AccountId, String)>,
}

/// Group collaboration service for one signed-in account.
///
/// Owns the session state and the creation workflow. Every operation runs a
/// store mutation and then re-fetches the slice it touched. Operations take
/// `&mut self`, so a second operation cannot start while one is awaiting
/// the store.
pub struct GroupService<S: GroupStore + ?Sized> {
    pub(super) store: Arc<S>,
    directory: Arc<dyn AccountDirectory>,
    pub(super) confirm: SharedConfirm,
    pub(super) event_bus: SharedEventBus,
    pub(super) account: AccountProfile,
    pub(super) session: GroupSession,
    creation: CreationWorkflow,
}

impl<S: GroupStore + ?Sized> GroupService<S> {
    pub fn new(
        store: Arc<S>,
        directory: Arc<dyn AccountDirectory>,
        confirm: SharedConfirm,
        event_bus: SharedEventBus,
        account: AccountProfile,
    ) -> Self {
        Self {
            store,
            directory,
            confirm,
            event_bus,
            account,
            session: GroupSession::new(),
            creation: CreationWorkflow::new(),
        }
    }

    pub fn account(&self) -> &AccountProfile {
        &self.account
    }

    pub fn session(&self) -> &GroupSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GroupSession {
        &mut self.session
    }

    pub fn creation(&self) -> &CreationWorkflow {
        &self.creation
    }

    // ====== Session ======

    pub async fn refresh_groups(&mut self) -> bool {
        let refreshed = self
            .session
            .refresh_groups(self.store.as_ref(), &self.account.id)
            .await;
        if refreshed {
            self.event_bus.publish(DomainEvent::GroupsRefreshed {
                count: self.session.groups().len(),
            });
        }
        refreshed
    }

    pub async fn refresh_detail(&mut self) -> bool {
        let refreshed = self.session.refresh_detail(self.store.as_ref()).await;
        if refreshed {
            if let Some(group_id) = self.session.selected().cloned() {
                self.event_bus.publish(DomainEvent::DetailRefreshed {
                    group_id,
                    member_count: self.session.members().len(),
                    reminder_count: self.session.reminders().len(),
                });
            }
        }
        refreshed
    }

    /// Select a group (or clear the selection) and load its detail.
    pub async fn select_group(&mut self, group_id: Option<GroupId>) {
        self.session.select(group_id.clone());
        self.event_bus
            .publish(DomainEvent::GroupSelected { group_id: group_id.clone() });
        if group_id.is_some() {
            self.refresh_detail().await;
        }
    }

    /// Look up accounts to stage or add.
    ///
    /// Excludes the acting account, candidates already staged while a group
    /// is being created, and current members of the selected group otherwise.
    pub async fn search_accounts(&self, term: &str) -> Result<Vec<AccountProfile>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let found = self.directory.search_accounts(term, SEARCH_LIMIT).await?;
        let creating = self.creation.step() == CreationStep::Members;

        Ok(found
            .into_iter()
            .filter(|p| p.id != self.account.id)
            .filter(|p| {
                if creating {
                    !self.creation.is_staged(&p.id)
                } else {
                    self.session.member(&p.id).is_none()
                }
            })
            .collect())
    }

    // ====== Group creation ======

    pub fn start_group_creation(&mut self) {
        self.creation.begin();
    }

    pub fn set_group_details(&mut self, name: &str, description: &str) -> Result<()> {
        self.creation.set_details(name, description)
    }

    /// Phase 1: write the group and the creator's admin membership.
    ///
    /// `Ok(None)` when the name is blank; nothing is written then. On failure
    /// the workflow stays on the details step for a retry.
    pub async fn create_group(&mut self) -> Result<Option<GroupId>> {
        let Some(new_group) = self.creation.group_to_create(self.account.id.clone())? else {
            return Ok(None);
        };

        let result = self
            .store
            .create_group_with_admin(&new_group, &self.account)
            .await;

        let (group, _admin) = match result {
            Ok(created) => created,
            Err(e) => {
                tracing::error!("Failed to create group '{}': {}", new_group.name, e);
                self.event_bus.alert("Error", e.user_message());
                return Err(e);
            }
        };

        tracing::info!("Created group {} ({})", group.name, group.id);
        self.creation.group_created(group.id.clone())?;
        self.event_bus.publish(DomainEvent::GroupCreated {
            group_id: group.id.clone(),
            name: group.name.clone(),
        });
        self.refresh_groups().await;

        Ok(Some(group.id))
    }

    pub fn stage_member(&mut self, candidate: AccountProfile) -> Result<bool> {
        if candidate.id == self.account.id {
            return Ok(false);
        }
        self.creation.stage(candidate)
    }

    pub fn unstage_member(&mut self, id: &AccountId) -> Result<bool> {
        self.creation.unstage(id)
    }

    /// Phase 2: add every staged member, then finish.
    ///
    /// Inserts run in staging order. A failed insert is logged and the
    /// remaining ones still run.
    pub async fn commit_members(&mut self) -> Result<CommitReport> {
        let group_id = match self.creation.created_group() {
            Some(id) if self.creation.step() == CreationStep::Members => id.clone(),
            _ => {
                return Err(DomainError::Validation(
                    "no group is waiting for members".to_string(),
                ))
            }
        };

        let pending = self.creation.staged().to_vec();
        let mut report = CommitReport {
            attempted: pending.len(),
            ..Default::default()
        };

        for candidate in &pending {
            let row = NewMembership::new(group_id.clone(), candidate, Role::Member);
            match self.store.insert_membership(&row).await {
                Ok(_) => report.added.push(candidate.id.clone()),
                Err(e) => {
                    tracing::warn!(
                        "Failed to add staged member {} to {}: {}",
                        candidate.email,
                        group_id,
                        e
                    );
                    report.failed.push((candidate.id.clone(), e.to_string()));
                }
            }
        }

        tracing::info!(
            "Committed {}/{} staged members to {}",
            report.added.len(),
            report.attempted,
            group_id
        );
        self.event_bus.publish(DomainEvent::MembersCommitted {
            group_id,
            added: report.added.len(),
            failed: report.failed.len(),
        });

        self.finish_creation().await?;
        Ok(report)
    }

    /// Phase 2 without adding anyone.
    pub async fn skip_members(&mut self) -> Result<GroupId> {
        self.finish_creation().await
    }

    /// Dismiss the creation dialog. Before phase 1 this discards the input;
    /// after it, the finish path runs so the new group is not abandoned.
    pub async fn close_group_creation(&mut self) -> Result<CloseAction> {
        let action = self.creation.request_close();
        if let CloseAction::Finish(_) = &action {
            self.finish_creation().await?;
        }
        Ok(action)
    }

    async fn finish_creation(&mut self) -> Result<GroupId> {
        let group_id = self.creation.finish()?;
        self.select_group(Some(group_id.clone())).await;
        self.refresh_groups().await;
        Ok(group_id)
    }
}
