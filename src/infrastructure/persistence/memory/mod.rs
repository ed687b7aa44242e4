//! In-process store with the same constraints as the SQL backends.
//!
//! Rows live for the lifetime of the process. Used for demos and tests.

use async_trait::async_trait;
use std::sync::Mutex;
use time::{Duration, OffsetDateTime};

use crate::domain::error::DomainError;
use crate::domain::model::{
    AccountId, AccountProfile, Group, GroupId, GroupReminder, Membership, MembershipId, NewGroup,
    NewGroupReminder, NewMembership, ReminderId,
};
use crate::domain::repository::{
    AccountDirectory, GroupRepository, GroupStore, MembershipRepository, ProfileRegistry,
    ReminderRepository, Result,
};

#[derive(Default)]
struct Tables {
    groups: Vec<Group>,
    memberships: Vec<Membership>,
    reminders: Vec<GroupReminder>,
    profiles: Vec<AccountProfile>,
    last_timestamp: Option<OffsetDateTime>,
}

impl Tables {
    /// Strictly increasing timestamps so ordering by creation is stable.
    fn now(&mut self) -> OffsetDateTime {
        let mut now = OffsetDateTime::now_utc();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn has_group(&self, id: &GroupId) -> bool {
        self.groups.iter().any(|g| &g.id == id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the account directory.
    pub fn with_profiles(profiles: impl IntoIterator<Item = AccountProfile>) -> Self {
        let store = Self::new();
        if let Ok(mut tables) = store.tables.lock() {
            tables.profiles.extend(profiles);
        }
        store
    }

    pub fn add_profile(&self, profile: AccountProfile) -> Result<()> {
        let mut tables = self.lock()?;
        tables.profiles.retain(|p| p.id != profile.id);
        tables.profiles.push(profile);
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn insert_group(&self, group: &NewGroup) -> Result<Group> {
        let mut tables = self.lock()?;
        let row = Group {
            id: GroupId::generate(),
            name: group.name.clone(),
            description: group.description.clone(),
            created_by: group.created_by.clone(),
            created_at: tables.now(),
        };
        tables.groups.push(row.clone());
        Ok(row)
    }

    async fn find_groups(&self, ids: &[GroupId]) -> Result<Vec<Group>> {
        let tables = self.lock()?;
        Ok(tables
            .groups
            .iter()
            .filter(|g| ids.contains(&g.id))
            .cloned()
            .collect())
    }

    async fn delete_group(&self, id: &GroupId) -> Result<()> {
        let mut tables = self.lock()?;
        tables.groups.retain(|g| &g.id != id);
        tables.memberships.retain(|m| &m.group_id != id);
        tables.reminders.retain(|r| &r.group_id != id);
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for MemoryStore {
    async fn insert_membership(&self, membership: &NewMembership) -> Result<Membership> {
        let mut tables = self.lock()?;
        if !tables.has_group(&membership.group_id) {
            return Err(DomainError::NotFound(format!(
                "Group {}",
                membership.group_id
            )));
        }
        if tables
            .memberships
            .iter()
            .any(|m| m.group_id == membership.group_id && m.user_id == membership.user_id)
        {
            return Err(DomainError::Conflict(
                "duplicate key value violates unique constraint \"memberships_group_id_user_id_key\""
                    .to_string(),
            ));
        }

        let row = Membership {
            id: MembershipId::generate(),
            group_id: membership.group_id.clone(),
            user_id: membership.user_id.clone(),
            email: membership.email.clone(),
            name: membership.name.clone(),
            role: membership.role,
            joined_at: tables.now(),
        };
        tables.memberships.push(row.clone());
        Ok(row)
    }

    async fn memberships_for_account(&self, user_id: &AccountId) -> Result<Vec<Membership>> {
        let tables = self.lock()?;
        Ok(tables
            .memberships
            .iter()
            .filter(|m| &m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn memberships_for_groups(&self, group_ids: &[GroupId]) -> Result<Vec<Membership>> {
        let tables = self.lock()?;
        let mut rows: Vec<Membership> = tables
            .memberships
            .iter()
            .filter(|m| group_ids.contains(&m.group_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(rows)
    }

    async fn delete_membership(&self, id: &MembershipId) -> Result<()> {
        let mut tables = self.lock()?;
        tables.memberships.retain(|m| &m.id != id);
        Ok(())
    }

    async fn delete_membership_for(&self, group_id: &GroupId, user_id: &AccountId) -> Result<()> {
        let mut tables = self.lock()?;
        tables
            .memberships
            .retain(|m| !(&m.group_id == group_id && &m.user_id == user_id));
        Ok(())
    }
}

#[async_trait]
impl ReminderRepository for MemoryStore {
    async fn insert_reminder(&self, reminder: &NewGroupReminder) -> Result<GroupReminder> {
        let mut tables = self.lock()?;
        if !tables.has_group(&reminder.group_id) {
            return Err(DomainError::NotFound(format!("Group {}", reminder.group_id)));
        }

        let row = GroupReminder {
            id: ReminderId::generate(),
            group_id: reminder.group_id.clone(),
            title: reminder.title.clone(),
            why: reminder.why.clone(),
            time: reminder.time,
            repeat: reminder.repeat,
            active: reminder.active,
            created_by: reminder.created_by.clone(),
            created_at: tables.now(),
        };
        tables.reminders.push(row.clone());
        Ok(row)
    }

    async fn reminders_for_groups(&self, group_ids: &[GroupId]) -> Result<Vec<GroupReminder>> {
        let tables = self.lock()?;
        let mut rows: Vec<GroupReminder> = tables
            .reminders
            .iter()
            .filter(|r| group_ids.contains(&r.group_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.created_at.cmp(&b.created_at)));
        Ok(rows)
    }

    async fn delete_reminder(&self, id: &ReminderId) -> Result<()> {
        let mut tables = self.lock()?;
        tables.reminders.retain(|r| &r.id != id);
        Ok(())
    }
}

#[async_trait]
impl AccountDirectory for MemoryStore {
    async fn search_accounts(&self, term: &str, limit: usize) -> Result<Vec<AccountProfile>> {
        let term = term.to_lowercase();
        let tables = self.lock()?;
        let mut found: Vec<AccountProfile> = tables
            .profiles
            .iter()
            .filter(|p| {
                p.email.to_lowercase().contains(&term)
                    || p
                        .name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&term))
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.email.cmp(&b.email));
        found.truncate(limit);
        Ok(found)
    }
}

#[async_trait]
impl ProfileRegistry for MemoryStore {
    async fn save_profile(&self, profile: &AccountProfile) -> Result<()> {
        self.add_profile(profile.clone())
    }
}

impl GroupStore for MemoryStore {}
