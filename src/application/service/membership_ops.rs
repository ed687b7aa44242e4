//! Add, remove and leave operations on group memberships.

use super::GroupService;
use crate::domain::error::DomainError;
use crate::domain::event::DomainEvent;
use crate::domain::model::{AccountProfile, GroupId, MembershipId, NewMembership, Role};
use crate::domain::repository::{GroupStore, Result};

impl<S: GroupStore + ?Sized> GroupService<S> {
    /// Pick the candidate the next [`add_member`](Self::add_member) will add.
    pub fn choose_member(&mut self, candidate: Option<AccountProfile>) {
        self.session.set_member_selection(candidate);
    }

    /// Add the chosen candidate to the selected group as a plain member.
    ///
    /// Returns `Ok(false)` when no group or candidate is selected. On failure
    /// the selection is kept so the user can retry.
    pub async fn add_member(&mut self) -> Result<bool> {
        let (Some(group_id), Some(candidate)) = (
            self.session.selected().cloned(),
            self.session.member_selection().cloned(),
        ) else {
            return Ok(false);
        };

        let row = NewMembership::new(group_id.clone(), &candidate, Role::Member);

        let result = self.store.insert_membership(&row).await;

        if let Err(e) = result {
            let e = if e.is_conflict() {
                DomainError::AlreadyMember(candidate.email.clone())
            } else {
                e
            };
            tracing::error!("Failed to add {} to {}: {}", candidate.email, group_id, e);
            self.event_bus.alert("Error", e.user_message());
            return Err(e);
        }

        tracing::info!("Added {} to group {}", candidate.email, group_id);
        self.session.set_member_selection(None);
        self.event_bus.publish(DomainEvent::MemberAdded {
            group_id,
            email: candidate.email,
        });
        self.refresh_detail().await;
        Ok(true)
    }

    /// Remove a member of the selected group after confirmation.
    ///
    /// Admin memberships and the caller's own membership cannot be removed
    /// this way. Returns `Ok(false)` if the user declines.
    pub async fn remove_member(&mut self, membership_id: &MembershipId) -> Result<bool> {
        let Some(target) = self
            .session
            .members()
            .iter()
            .find(|m| &m.id == membership_id)
            .cloned()
        else {
            return Err(DomainError::NotFound(format!("Membership {}", membership_id)));
        };

        let refused = if target.user_id == self.account.id {
            Some("Use leave group to remove yourself")
        } else if target.is_admin() {
            Some("Group admins cannot be removed")
        } else {
            None
        };
        if let Some(reason) = refused {
            let e = DomainError::Forbidden(reason.to_string());
            self.event_bus.alert("Error", e.user_message());
            return Err(e);
        }

        let prompt = format!("Remove {} from this group?", target.display_name());
        if !self.confirm.confirm("Remove Member", &prompt) {
            return Ok(false);
        }

        let result = self.store.delete_membership(membership_id).await;

        if let Err(e) = result {
            tracing::error!("Failed to remove membership {}: {}", membership_id, e);
            self.event_bus.alert("Error", e.user_message());
            return Err(e);
        }

        tracing::info!("Removed {} from group {}", target.email, target.group_id);
        self.event_bus.publish(DomainEvent::MemberRemoved {
            group_id: target.group_id,
        });
        self.refresh_detail().await;
        Ok(true)
    }

    /// Leave `group_id` after confirmation.
    ///
    /// The last admin cannot leave while other members remain. If the caller
    /// is the only member, the group and its reminders are deleted.
    pub async fn leave_group(&mut self, group_id: &GroupId) -> Result<bool> {
        let members = match self
            .store
            .memberships_for_groups(std::slice::from_ref(group_id))
            .await
        {
            Ok(members) => members,
            Err(e) => {
                tracing::error!("Failed to load members of {}: {}", group_id, e);
                self.event_bus.alert("Error", e.user_message());
                return Err(e);
            }
        };

        let own = members.iter().find(|m| m.user_id == self.account.id);
        let others = members.iter().filter(|m| m.user_id != self.account.id).count();
        let other_admins = members
            .iter()
            .filter(|m| m.user_id != self.account.id && m.is_admin())
            .count();

        if own.is_some_and(|m| m.is_admin()) && other_admins == 0 && others > 0 {
            let e = DomainError::Forbidden(
                "You are the last admin of this group and cannot leave while it has other members"
                    .to_string(),
            );
            self.event_bus.alert("Error", e.user_message());
            return Err(e);
        }

        let deletes_group = own.is_some() && others == 0;
        let prompt = if deletes_group {
            "You are the only member. Leaving will delete this group and its reminders."
        } else {
            "Are you sure you want to leave this group?"
        };
        if !self.confirm.confirm("Leave Group", prompt) {
            return Ok(false);
        }

        let result = if deletes_group {
            self.store.delete_group(group_id).await
        } else {
            self.store
                .delete_membership_for(group_id, &self.account.id)
                .await
        };

        if let Err(e) = result {
            tracing::error!("Failed to leave group {}: {}", group_id, e);
            self.event_bus.alert("Error", e.user_message());
            return Err(e);
        }

        tracing::info!(
            "Left group {}{}",
            group_id,
            if deletes_group { " (deleted)" } else { "" }
        );
        self.event_bus.publish(DomainEvent::GroupLeft {
            group_id: group_id.clone(),
        });
        self.select_group(None).await;
        self.refresh_groups().await;
        Ok(true)
    }
}
