use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, Row};
use time::OffsetDateTime;

use super::membership_repo::insert_membership_row;
use super::{from_micros, placeholders, to_micros, SqliteStore};
use crate::domain::model::{
    AccountProfile, Group, GroupId, Membership, NewGroup, NewMembership, Role,
};
use crate::domain::repository::{GroupRepository, GroupStore, Result};

const GROUP_COLUMNS: &str = "id, name, description, created_by, created_at";

fn map_group(row: &Row) -> rusqlite::Result<Group> {
    Ok(Group {
        id: GroupId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        created_by: row.get::<_, String>(3)?.into(),
        created_at: from_micros(4, row.get(4)?)?,
    })
}

fn insert_group_row(conn: &Connection, group: &NewGroup) -> Result<Group> {
    let row = Group {
        id: GroupId::generate(),
        name: group.name.clone(),
        description: group.description.clone(),
        created_by: group.created_by.clone(),
        created_at: OffsetDateTime::now_utc(),
    };

    conn.execute(
        "INSERT INTO groups (id, name, description, created_by, created_at)
         VALUES (?, ?, ?, ?, ?)",
        params![
            row.id.as_str(),
            row.name,
            row.description,
            row.created_by.as_str(),
            to_micros(row.created_at),
        ],
    )?;

    Ok(row)
}

#[async_trait]
impl GroupRepository for SqliteStore {
    async fn insert_group(&self, group: &NewGroup) -> Result<Group> {
        let conn = self.lock()?;
        insert_group_row(&conn, group)
    }

    async fn find_groups(&self, ids: &[GroupId]) -> Result<Vec<Group>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM groups WHERE id IN ({}) ORDER BY created_at DESC, rowid DESC",
            GROUP_COLUMNS,
            placeholders(ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(ids.iter().map(GroupId::as_str)), map_group)?;

        let mut groups = Vec::new();
        for group in rows {
            groups.push(group?);
        }

        Ok(groups)
    }

    async fn delete_group(&self, id: &GroupId) -> Result<()> {
        let conn = self.lock()?;

        // memberships and reminders go with it (ON DELETE CASCADE)
        conn.execute("DELETE FROM groups WHERE id = ?", params![id.as_str()])?;

        Ok(())
    }
}

#[async_trait]
impl GroupStore for SqliteStore {
    async fn create_group_with_admin(
        &self,
        group: &NewGroup,
        creator: &AccountProfile,
    ) -> Result<(Group, Membership)> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let created = insert_group_row(&tx, group)?;
        let admin = NewMembership::new(created.id.clone(), creator, Role::Admin);
        let membership = insert_membership_row(&tx, &admin)?;

        tx.commit()?;
        Ok((created, membership))
    }
}
