use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, Row};
use time::OffsetDateTime;

use super::{conversion_error, from_micros, placeholders, to_micros, SqliteStore};
use crate::domain::model::{AccountId, GroupId, Membership, MembershipId, NewMembership, Role};
use crate::domain::repository::{MembershipRepository, Result};

const MEMBERSHIP_COLUMNS: &str = "id, group_id, user_id, email, name, role, joined_at";

fn map_membership(row: &Row) -> rusqlite::Result<Membership> {
    let role: String = row.get(5)?;
    Ok(Membership {
        id: MembershipId(row.get(0)?),
        group_id: GroupId(row.get(1)?),
        user_id: AccountId(row.get(2)?),
        email: row.get(3)?,
        name: row.get(4)?,
        role: role.parse::<Role>().map_err(|e| conversion_error(5, e))?,
        joined_at: from_micros(6, row.get(6)?)?,
    })
}

pub(super) fn insert_membership_row(
    conn: &Connection,
    membership: &NewMembership,
) -> Result<Membership> {
    let row = Membership {
        id: MembershipId::generate(),
        group_id: membership.group_id.clone(),
        user_id: membership.user_id.clone(),
        email: membership.email.clone(),
        name: membership.name.clone(),
        role: membership.role,
        joined_at: OffsetDateTime::now_utc(),
    };

    conn.execute(
        "INSERT INTO memberships (id, group_id, user_id, email, name, role, joined_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            row.id.as_str(),
            row.group_id.as_str(),
            row.user_id.as_str(),
            row.email,
            row.name,
            row.role.as_str(),
            to_micros(row.joined_at),
        ],
    )?;

    Ok(row)
}

#[async_trait]
impl MembershipRepository for SqliteStore {
    async fn insert_membership(&self, membership: &NewMembership) -> Result<Membership> {
        let conn = self.lock()?;
        insert_membership_row(&conn, membership)
    }

    async fn memberships_for_account(&self, user_id: &AccountId) -> Result<Vec<Membership>> {
        let conn = self.lock()?;

        let sql = format!(
            "SELECT {} FROM memberships WHERE user_id = ? ORDER BY joined_at ASC, rowid ASC",
            MEMBERSHIP_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id.as_str()], map_membership)?;

        let mut memberships = Vec::new();
        for membership in rows {
            memberships.push(membership?);
        }

        Ok(memberships)
    }

    async fn memberships_for_groups(&self, group_ids: &[GroupId]) -> Result<Vec<Membership>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM memberships WHERE group_id IN ({}) ORDER BY joined_at ASC, rowid ASC",
            MEMBERSHIP_COLUMNS,
            placeholders(group_ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params_from_iter(group_ids.iter().map(GroupId::as_str)),
            map_membership,
        )?;

        let mut memberships = Vec::new();
        for membership in rows {
            memberships.push(membership?);
        }

        Ok(memberships)
    }

    async fn delete_membership(&self, id: &MembershipId) -> Result<()> {
        let conn = self.lock()?;

        conn.execute("DELETE FROM memberships WHERE id = ?", params![id.as_str()])?;

        Ok(())
    }

    async fn delete_membership_for(&self, group_id: &GroupId, user_id: &AccountId) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "DELETE FROM memberships WHERE group_id = ? AND user_id = ?",
            params![group_id.as_str(), user_id.as_str()],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AccountProfile, NewGroup};
    use crate::domain::repository::GroupStore;

    #[tokio::test]
    async fn test_unique_group_member_pair() {
        let store = SqliteStore::open_in_memory().unwrap();
        let me = AccountProfile::new("me", "me@x.com", None);
        let new_group = NewGroup::from_input("Pair", "", me.id.clone()).unwrap();
        let (group, _) = store.create_group_with_admin(&new_group, &me).await.unwrap();

        let friend = AccountProfile::new("u2", "a@x.com", Some("Ann"));
        let row = NewMembership::new(group.id.clone(), &friend, Role::Member);
        store.insert_membership(&row).await.unwrap();

        let err = store.insert_membership(&row).await.unwrap_err();
        assert!(err.is_conflict(), "expected conflict, got {:?}", err);
    }

    #[tokio::test]
    async fn test_membership_requires_existing_group() {
        let store = SqliteStore::open_in_memory().unwrap();
        let friend = AccountProfile::new("u2", "a@x.com", None);
        let row = NewMembership::new(GroupId::from("missing"), &friend, Role::Member);
        let err = store.insert_membership(&row).await.unwrap_err();
        assert!(!err.is_conflict(), "foreign key failure reported as {:?}", err);
        assert!(err.user_message().contains("FOREIGN KEY"));
    }

    #[tokio::test]
    async fn test_delete_membership_for_pair() {
        let store = SqliteStore::open_in_memory().unwrap();
        let me = AccountProfile::new("me", "me@x.com", None);
        let new_group = NewGroup::from_input("Leavers", "", me.id.clone()).unwrap();
        let (group, _) = store.create_group_with_admin(&new_group, &me).await.unwrap();
        let friend = AccountProfile::new("u2", "a@x.com", None);
        store
            .insert_membership(&NewMembership::new(group.id.clone(), &friend, Role::Member))
            .await
            .unwrap();

        store.delete_membership_for(&group.id, &friend.id).await.unwrap();

        let members = store.memberships_for_groups(&[group.id]).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, me.id);
        assert_eq!(members[0].name, None);
    }
}
