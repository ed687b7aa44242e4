//! MongoDB group store
//!
//! Uses `_id` as primary key (mapped from the entity id). Timestamps are kept
//! as unix microseconds, the same as the SQLite backend. MongoDB transactions
//! need a replica set, so group creation relies on the compensating delete of
//! the default `create_group_with_admin`.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Collection;
use std::sync::Arc;
use time::OffsetDateTime;

use super::connection::{MongoConnection, GROUPS, GROUP_REMINDERS, MEMBERSHIPS, PROFILES};
use crate::domain::error::DomainError;
use crate::domain::model::{
    AccountId, AccountProfile, Group, GroupId, GroupReminder, Membership, MembershipId, NewGroup,
    NewGroupReminder, NewMembership, ReminderId, Repeat, Role, TimeOfDay,
};
use crate::domain::repository::{
    AccountDirectory, GroupRepository, GroupStore, MembershipRepository, ProfileRegistry,
    ReminderRepository, Result,
};

fn micros(t: OffsetDateTime) -> i64 {
    (t.unix_timestamp_nanos() / 1_000) as i64
}

fn from_micros(value: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(value as i128 * 1_000)
        .map_err(|e| DomainError::Database(e.to_string()))
}

fn id_strings<T: AsRef<str>>(ids: impl IntoIterator<Item = T>) -> Vec<String> {
    ids.into_iter().map(|id| id.as_ref().to_string()).collect()
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct GroupDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    created_by: String,
    created_at: i64,
}

impl GroupDocument {
    fn into_group(self) -> Result<Group> {
        Ok(Group {
            id: GroupId(self.id),
            name: self.name,
            description: self.description,
            created_by: AccountId(self.created_by),
            created_at: from_micros(self.created_at)?,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct MembershipDocument {
    #[serde(rename = "_id")]
    id: String,
    group_id: String,
    user_id: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    role: Role,
    joined_at: i64,
}

impl MembershipDocument {
    fn into_membership(self) -> Result<Membership> {
        Ok(Membership {
            id: MembershipId(self.id),
            group_id: GroupId(self.group_id),
            user_id: AccountId(self.user_id),
            email: self.email,
            name: self.name,
            role: self.role,
            joined_at: from_micros(self.joined_at)?,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct ReminderDocument {
    #[serde(rename = "_id")]
    id: String,
    group_id: String,
    title: String,
    #[serde(default)]
    why: Option<String>,
    time: TimeOfDay,
    repeat: Repeat,
    active: bool,
    created_by: String,
    created_at: i64,
}

impl ReminderDocument {
    fn into_reminder(self) -> Result<GroupReminder> {
        Ok(GroupReminder {
            id: ReminderId(self.id),
            group_id: GroupId(self.group_id),
            title: self.title,
            why: self.why,
            time: self.time,
            repeat: self.repeat,
            active: self.active,
            created_by: AccountId(self.created_by),
            created_at: from_micros(self.created_at)?,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct ProfileDocument {
    #[serde(rename = "_id")]
    id: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
}

/// Escape regex metacharacters so the search term is matched literally
fn regex_escape(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub struct MongoStore {
    groups: Collection<GroupDocument>,
    memberships: Collection<MembershipDocument>,
    reminders: Collection<ReminderDocument>,
    profiles: Collection<ProfileDocument>,
}

impl MongoStore {
    pub fn new(conn: Arc<MongoConnection>) -> Self {
        Self {
            groups: conn.collection(GROUPS),
            memberships: conn.collection(MEMBERSHIPS),
            reminders: conn.collection(GROUP_REMINDERS),
            profiles: conn.collection(PROFILES),
        }
    }

    async fn find_memberships(&self, filter: Document) -> Result<Vec<Membership>> {
        let cursor = self
            .memberships
            .find(filter)
            .sort(doc! { "joined_at": 1, "_id": 1 })
            .await?;
        let docs: Vec<MembershipDocument> = cursor.try_collect().await?;
        docs.into_iter()
            .map(MembershipDocument::into_membership)
            .collect()
    }
}

#[async_trait]
impl GroupRepository for MongoStore {
    async fn insert_group(&self, group: &NewGroup) -> Result<Group> {
        let doc = GroupDocument {
            id: GroupId::generate().0,
            name: group.name.clone(),
            description: group.description.clone(),
            created_by: group.created_by.0.clone(),
            created_at: micros(OffsetDateTime::now_utc()),
        };
        self.groups.insert_one(&doc).await?;
        doc.into_group()
    }

    async fn find_groups(&self, ids: &[GroupId]) -> Result<Vec<Group>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .groups
            .find(doc! { "_id": { "$in": id_strings(ids.iter().map(GroupId::as_str)) } })
            .sort(doc! { "created_at": -1 })
            .await?;
        let docs: Vec<GroupDocument> = cursor.try_collect().await?;
        docs.into_iter().map(GroupDocument::into_group).collect()
    }

    async fn delete_group(&self, id: &GroupId) -> Result<()> {
        // No cascading deletes in MongoDB: children first
        self.reminders
            .delete_many(doc! { "group_id": id.as_str() })
            .await?;
        self.memberships
            .delete_many(doc! { "group_id": id.as_str() })
            .await?;
        self.groups.delete_one(doc! { "_id": id.as_str() }).await?;
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for MongoStore {
    async fn insert_membership(&self, membership: &NewMembership) -> Result<Membership> {
        let parent = self
            .groups
            .find_one(doc! { "_id": membership.group_id.as_str() })
            .await?;
        if parent.is_none() {
            return Err(DomainError::NotFound(format!(
                "Group {}",
                membership.group_id
            )));
        }

        let doc = MembershipDocument {
            id: MembershipId::generate().0,
            group_id: membership.group_id.0.clone(),
            user_id: membership.user_id.0.clone(),
            email: membership.email.clone(),
            name: membership.name.clone(),
            role: membership.role,
            joined_at: micros(OffsetDateTime::now_utc()),
        };
        self.memberships.insert_one(&doc).await?;
        doc.into_membership()
    }

    async fn memberships_for_account(&self, user_id: &AccountId) -> Result<Vec<Membership>> {
        self.find_memberships(doc! { "user_id": user_id.as_str() })
            .await
    }

    async fn memberships_for_groups(&self, group_ids: &[GroupId]) -> Result<Vec<Membership>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find_memberships(
            doc! { "group_id": { "$in": id_strings(group_ids.iter().map(GroupId::as_str)) } },
        )
        .await
    }

    async fn delete_membership(&self, id: &MembershipId) -> Result<()> {
        self.memberships
            .delete_one(doc! { "_id": id.as_str() })
            .await?;
        Ok(())
    }

    async fn delete_membership_for(&self, group_id: &GroupId, user_id: &AccountId) -> Result<()> {
        self.memberships
            .delete_many(doc! { "group_id": group_id.as_str(), "user_id": user_id.as_str() })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ReminderRepository for MongoStore {
    async fn insert_reminder(&self, reminder: &NewGroupReminder) -> Result<GroupReminder> {
        let doc = ReminderDocument {
            id: ReminderId::generate().0,
            group_id: reminder.group_id.0.clone(),
            title: reminder.title.clone(),
            why: reminder.why.clone(),
            time: reminder.time,
            repeat: reminder.repeat,
            active: reminder.active,
            created_by: reminder.created_by.0.clone(),
            created_at: micros(OffsetDateTime::now_utc()),
        };
        self.reminders.insert_one(&doc).await?;
        doc.into_reminder()
    }

    async fn reminders_for_groups(&self, group_ids: &[GroupId]) -> Result<Vec<GroupReminder>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .reminders
            .find(doc! { "group_id": { "$in": id_strings(group_ids.iter().map(GroupId::as_str)) } })
            .sort(doc! { "time": 1, "created_at": 1 })
            .await?;
        let docs: Vec<ReminderDocument> = cursor.try_collect().await?;
        docs.into_iter().map(ReminderDocument::into_reminder).collect()
    }

    async fn delete_reminder(&self, id: &ReminderId) -> Result<()> {
        self.reminders.delete_one(doc! { "_id": id.as_str() }).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountDirectory for MongoStore {
    async fn search_accounts(&self, term: &str, limit: usize) -> Result<Vec<AccountProfile>> {
        let pattern = regex_escape(term);
        let cursor = self
            .profiles
            .find(doc! {
                "$or": [
                    { "email": { "$regex": pattern.clone(), "$options": "i" } },
                    { "name": { "$regex": pattern.clone(), "$options": "i" } },
                ]
            })
            .sort(doc! { "email": 1 })
            .limit(limit as i64)
            .await?;
        let docs: Vec<ProfileDocument> = cursor.try_collect().await?;

        Ok(docs
            .into_iter()
            .map(|d| AccountProfile {
                id: AccountId(d.id),
                email: d.email,
                name: d.name,
            })
            .collect())
    }
}

#[async_trait]
impl ProfileRegistry for MongoStore {
    async fn save_profile(&self, profile: &AccountProfile) -> Result<()> {
        let doc = ProfileDocument {
            id: profile.id.0.clone(),
            email: profile.email.clone(),
            name: profile.name.clone(),
        };
        self.profiles
            .replace_one(doc! { "_id": profile.id.as_str() }, &doc)
            .upsert(true)
            .await?;
        Ok(())
    }
}

impl GroupStore for MongoStore {}
