use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::model::{
    AccountId, AccountProfile, Group, GroupId, GroupReminder, Membership, MembershipId,
    NewGroup, NewGroupReminder, NewMembership, ReminderId, Role,
};

pub type Result<T> = std::result::Result<T, DomainError>;

/// Repository trait for the `groups` resource
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn insert_group(&self, group: &NewGroup) -> Result<Group>;
    /// Select groups whose id is in `ids`. Unknown ids are skipped.
    async fn find_groups(&self, ids: &[GroupId]) -> Result<Vec<Group>>;
    async fn delete_group(&self, id: &GroupId) -> Result<()>;
}

/// Repository trait for the `memberships` resource
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Insert one membership. A duplicate (group, account) pair fails with
    /// [`DomainError::Conflict`].
    async fn insert_membership(&self, membership: &NewMembership) -> Result<Membership>;
    async fn memberships_for_account(&self, user_id: &AccountId) -> Result<Vec<Membership>>;
    /// Members of every group in `group_ids`, ordered by join time.
    async fn memberships_for_groups(&self, group_ids: &[GroupId]) -> Result<Vec<Membership>>;
    async fn delete_membership(&self, id: &MembershipId) -> Result<()>;
    async fn delete_membership_for(&self, group_id: &GroupId, user_id: &AccountId) -> Result<()>;
}

/// Repository trait for the `group_reminders` resource
#[async_trait]
pub trait ReminderRepository: Send + Sync {
    async fn insert_reminder(&self, reminder: &NewGroupReminder) -> Result<GroupReminder>;
    /// Reminders of every group in `group_ids`, ascending by time of day.
    async fn reminders_for_groups(&self, group_ids: &[GroupId]) -> Result<Vec<GroupReminder>>;
    /// Deleting a row that is already gone is not an error.
    async fn delete_reminder(&self, id: &ReminderId) -> Result<()>;
}

/// Account directory lookup
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Case-insensitive substring search over email and display name.
    async fn search_accounts(&self, term: &str, limit: usize) -> Result<Vec<AccountProfile>>;
}

/// Write side of the account directory, for stores that own their profiles.
///
/// Hosted stores fill `profiles` from their sign-up flow and do not
/// implement this.
#[async_trait]
pub trait ProfileRegistry: Send + Sync {
    /// Insert or replace the profile with the same id.
    async fn save_profile(&self, profile: &AccountProfile) -> Result<()>;
}

/// The full store the group service runs against.
#[async_trait]
pub trait GroupStore: GroupRepository + MembershipRepository + ReminderRepository {
    /// Insert a group together with its creator's admin membership.
    ///
    /// The default runs the two inserts in order and deletes the group again
    /// if the membership insert fails. Backends with transactions override it.
    async fn create_group_with_admin(
        &self,
        group: &NewGroup,
        creator: &AccountProfile,
    ) -> Result<(Group, Membership)> {
        let created = self.insert_group(group).await?;

        let admin = NewMembership::new(created.id.clone(), creator, Role::Admin);
        match self.insert_membership(&admin).await {
            Ok(membership) => Ok((created, membership)),
            Err(e) => {
                tracing::warn!(
                    "Admin membership insert failed for group {}, rolling back: {}",
                    created.id,
                    e
                );
                if let Err(rollback) = self.delete_group(&created.id).await {
                    tracing::error!(
                        "Failed to delete admin-less group {}: {}",
                        created.id,
                        rollback
                    );
                }
                Err(e)
            }
        }
    }
}
