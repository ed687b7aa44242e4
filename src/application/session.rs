//! In-memory view of the user's groups and the selected group's detail.
//!
//! Every slice is replaced wholesale from a fresh fetch. A failed fetch is
//! logged and leaves the previous data in place.

use std::collections::{HashMap, HashSet};

use crate::domain::model::{
    AccountId, AccountProfile, GroupId, GroupReminder, GroupSummary, Membership, ReminderDraft,
};
use crate::domain::repository::{GroupStore, Result};

#[derive(Debug, Default)]
pub struct GroupSession {
    groups: Vec<GroupSummary>,
    selected: Option<GroupId>,
    members: Vec<Membership>,
    reminders: Vec<GroupReminder>,
    /// Candidate picked in the add-member search, kept until the add succeeds
    member_selection: Option<AccountProfile>,
    reminder_form: ReminderDraft,
}

impl GroupSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[GroupSummary] {
        &self.groups
    }

    pub fn group(&self, id: &GroupId) -> Option<&GroupSummary> {
        self.groups.iter().find(|g| g.id() == id)
    }

    pub fn selected(&self) -> Option<&GroupId> {
        self.selected.as_ref()
    }

    pub fn selected_group(&self) -> Option<&GroupSummary> {
        self.selected.as_ref().and_then(|id| self.group(id))
    }

    pub fn members(&self) -> &[Membership] {
        &self.members
    }

    pub fn member(&self, user_id: &AccountId) -> Option<&Membership> {
        self.members.iter().find(|m| &m.user_id == user_id)
    }

    pub fn reminders(&self) -> &[GroupReminder] {
        &self.reminders
    }

    pub fn member_selection(&self) -> Option<&AccountProfile> {
        self.member_selection.as_ref()
    }

    pub fn set_member_selection(&mut self, candidate: Option<AccountProfile>) {
        self.member_selection = candidate;
    }

    pub fn reminder_form(&self) -> &ReminderDraft {
        &self.reminder_form
    }

    pub fn reminder_form_mut(&mut self) -> &mut ReminderDraft {
        &mut self.reminder_form
    }

    pub fn reset_reminder_form(&mut self) {
        self.reminder_form = ReminderDraft::default();
    }

    /// Change the selection. Detail slices of a previous selection are dropped
    /// so they are never shown under another group.
    pub fn select(&mut self, group_id: Option<GroupId>) {
        if self.selected != group_id {
            self.members.clear();
            self.reminders.clear();
            self.member_selection = None;
            self.reset_reminder_form();
        }
        self.selected = group_id;
    }

    pub fn replace_groups(&mut self, groups: Vec<GroupSummary>) {
        self.groups = groups;
    }

    /// Replace members and reminders if `group_id` is still selected.
    pub fn replace_detail(
        &mut self,
        group_id: &GroupId,
        members: Vec<Membership>,
        reminders: Vec<GroupReminder>,
    ) -> bool {
        if self.selected.as_ref() != Some(group_id) {
            tracing::debug!("Dropping detail for deselected group {}", group_id);
            return false;
        }
        self.members = members;
        self.reminders = reminders;
        true
    }

    pub fn replace_reminders(&mut self, group_id: &GroupId, reminders: Vec<GroupReminder>) -> bool {
        if self.selected.as_ref() != Some(group_id) {
            return false;
        }
        self.reminders = reminders;
        true
    }

    /// Re-fetch the groups `account` belongs to.
    pub async fn refresh_groups<S>(&mut self, store: &S, account: &AccountId) -> bool
    where
        S: GroupStore + ?Sized,
    {
        match load_groups(store, account).await {
            Ok(groups) => {
                tracing::debug!("Fetched {} groups for {}", groups.len(), account);
                self.replace_groups(groups);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to fetch groups, keeping previous list: {}", e);
                false
            }
        }
    }

    /// Re-fetch members and reminders of the selected group.
    pub async fn refresh_detail<S>(&mut self, store: &S) -> bool
    where
        S: GroupStore + ?Sized,
    {
        let Some(group_id) = self.selected.clone() else {
            return false;
        };
        let ids = [group_id.clone()];

        let members = match store.memberships_for_groups(&ids).await {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!("Failed to fetch members of {}: {}", group_id, e);
                return false;
            }
        };
        let reminders = match store.reminders_for_groups(&ids).await {
            Ok(reminders) => reminders,
            Err(e) => {
                tracing::warn!("Failed to fetch reminders of {}: {}", group_id, e);
                return false;
            }
        };

        self.replace_detail(&group_id, members, reminders)
    }

    /// Re-fetch only the reminders of the selected group.
    pub async fn refresh_reminders<S>(&mut self, store: &S) -> bool
    where
        S: GroupStore + ?Sized,
    {
        let Some(group_id) = self.selected.clone() else {
            return false;
        };

        match store.reminders_for_groups(&[group_id.clone()]).await {
            Ok(reminders) => self.replace_reminders(&group_id, reminders),
            Err(e) => {
                tracing::warn!("Failed to fetch reminders of {}: {}", group_id, e);
                false
            }
        }
    }
}

/// Groups `account` belongs to with derived counts, newest first.
///
/// Memberships are read first and the groups fetched by id set; no
/// server-side join is assumed.
pub async fn load_groups<S>(store: &S, account: &AccountId) -> Result<Vec<GroupSummary>>
where
    S: GroupStore + ?Sized,
{
    let own = store.memberships_for_account(account).await?;

    let mut seen = HashSet::new();
    let ids: Vec<GroupId> = own
        .into_iter()
        .map(|m| m.group_id)
        .filter(|id| seen.insert(id.clone()))
        .collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let groups = store.find_groups(&ids).await?;
    let members = store.memberships_for_groups(&ids).await?;
    let reminders = store.reminders_for_groups(&ids).await?;

    let mut member_counts: HashMap<&GroupId, usize> = HashMap::new();
    for m in &members {
        *member_counts.entry(&m.group_id).or_default() += 1;
    }
    let mut reminder_counts: HashMap<&GroupId, usize> = HashMap::new();
    for r in &reminders {
        *reminder_counts.entry(&r.group_id).or_default() += 1;
    }

    let mut summaries: Vec<GroupSummary> = groups
        .into_iter()
        .map(|group| GroupSummary {
            member_count: member_counts.get(&group.id).copied().unwrap_or(0),
            reminder_count: reminder_counts.get(&group.id).copied().unwrap_or(0),
            group,
        })
        .collect();
    summaries.sort_by(|a, b| {
        b.group
            .created_at
            .cmp(&a.group.created_at)
            .then_with(|| a.group.id.cmp(&b.group.id))
    });

    Ok(summaries)
}
