use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Row};
use time::OffsetDateTime;

use super::{conversion_error, from_micros, placeholders, to_micros, SqliteStore};
use crate::domain::model::{
    AccountId, GroupId, GroupReminder, NewGroupReminder, ReminderId, Repeat, TimeOfDay,
};
use crate::domain::repository::{ReminderRepository, Result};

const REMINDER_COLUMNS: &str =
    "id, group_id, title, why, time, repeat, active, created_by, created_at";

fn map_reminder(row: &Row) -> rusqlite::Result<GroupReminder> {
    let time: String = row.get(4)?;
    let repeat: String = row.get(5)?;
    Ok(GroupReminder {
        id: ReminderId(row.get(0)?),
        group_id: GroupId(row.get(1)?),
        title: row.get(2)?,
        why: row.get(3)?,
        time: time
            .parse::<TimeOfDay>()
            .map_err(|e| conversion_error(4, e))?,
        repeat: repeat.parse::<Repeat>().map_err(|e| conversion_error(5, e))?,
        active: row.get(6)?,
        created_by: AccountId(row.get(7)?),
        created_at: from_micros(8, row.get(8)?)?,
    })
}

#[async_trait]
impl ReminderRepository for SqliteStore {
    async fn insert_reminder(&self, reminder: &NewGroupReminder) -> Result<GroupReminder> {
        let conn = self.lock()?;

        let row = GroupReminder {
            id: ReminderId::generate(),
            group_id: reminder.group_id.clone(),
            title: reminder.title.clone(),
            why: reminder.why.clone(),
            time: reminder.time,
            repeat: reminder.repeat,
            active: reminder.active,
            created_by: reminder.created_by.clone(),
            created_at: OffsetDateTime::now_utc(),
        };

        conn.execute(
            "INSERT INTO group_reminders
             (id, group_id, title, why, time, repeat, active, created_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                row.id.as_str(),
                row.group_id.as_str(),
                row.title,
                row.why,
                row.time.to_storage(),
                row.repeat.as_str(),
                row.active,
                row.created_by.as_str(),
                to_micros(row.created_at),
            ],
        )?;

        Ok(row)
    }

    async fn reminders_for_groups(&self, group_ids: &[GroupId]) -> Result<Vec<GroupReminder>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.lock()?;
        // zero-padded HH:MM:SS sorts chronologically as text
        let sql = format!(
            "SELECT {} FROM group_reminders WHERE group_id IN ({})
             ORDER BY time ASC, created_at ASC, rowid ASC",
            REMINDER_COLUMNS,
            placeholders(group_ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params_from_iter(group_ids.iter().map(GroupId::as_str)),
            map_reminder,
        )?;

        let mut reminders = Vec::new();
        for reminder in rows {
            reminders.push(reminder?);
        }

        Ok(reminders)
    }

    async fn delete_reminder(&self, id: &ReminderId) -> Result<()> {
        let conn = self.lock()?;

        conn.execute("DELETE FROM group_reminders WHERE id = ?", params![id.as_str()])?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AccountProfile, NewGroup, ReminderDraft};
    use crate::domain::repository::GroupStore;

    #[tokio::test]
    async fn test_reminders_ordered_by_time_and_delete_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let me = AccountProfile::new("me", "me@x.com", None);
        let new_group = NewGroup::from_input("Morning", "", me.id.clone()).unwrap();
        let (group, _) = store.create_group_with_admin(&new_group, &me).await.unwrap();

        let mut ids = Vec::new();
        for (title, time) in [("lunch", "12:30"), ("wake", "07:00"), ("sleep", "22:15")] {
            let draft = ReminderDraft::new(title, time.parse().unwrap(), Repeat::Daily)
                .with_why("routine");
            let row = draft.to_insert(group.id.clone(), me.id.clone()).unwrap();
            ids.push(store.insert_reminder(&row).await.unwrap().id);
        }

        let reminders = store.reminders_for_groups(&[group.id.clone()]).await.unwrap();
        let titles: Vec<_> = reminders.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["wake", "lunch", "sleep"]);
        assert!(reminders.iter().all(|r| r.active));
        assert_eq!(reminders[0].why.as_deref(), Some("routine"));

        store.delete_reminder(&ids[0]).await.unwrap();
        store.delete_reminder(&ids[0]).await.unwrap();

        let reminders = store.reminders_for_groups(&[group.id]).await.unwrap();
        assert_eq!(reminders.len(), 2);
    }
}
