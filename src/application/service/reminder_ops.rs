//! Create and delete operations on group reminders.

use super::GroupService;
use crate::domain::event::DomainEvent;
use crate::domain::model::{ReminderDraft, ReminderId};
use crate::domain::repository::{GroupStore, Result};

impl<S: GroupStore + ?Sized> GroupService<S> {
    pub fn reminder_form_mut(&mut self) -> &mut ReminderDraft {
        self.session.reminder_form_mut()
    }

    /// Insert the reminder form as an active reminder of the selected group.
    ///
    /// `Ok(None)` when no group is selected or the form is incomplete. The
    /// form is cleared only after the insert succeeds.
    pub async fn create_reminder(&mut self) -> Result<Option<ReminderId>> {
        let Some(group_id) = self.session.selected().cloned() else {
            return Ok(None);
        };
        let Some(row) = self
            .session
            .reminder_form()
            .to_insert(group_id.clone(), self.account.id.clone())
        else {
            return Ok(None);
        };

        let result = self.store.insert_reminder(&row).await;

        let reminder = match result {
            Ok(reminder) => reminder,
            Err(e) => {
                tracing::error!("Failed to create reminder in {}: {}", group_id, e);
                self.event_bus.alert("Error", e.user_message());
                return Err(e);
            }
        };

        tracing::info!(
            "Created reminder '{}' at {} ({}) in {}",
            reminder.title,
            reminder.time,
            reminder.repeat,
            group_id
        );
        self.session.reset_reminder_form();
        self.event_bus.publish(DomainEvent::ReminderCreated {
            group_id,
            reminder_id: reminder.id.clone(),
        });
        self.session.refresh_reminders(self.store.as_ref()).await;
        Ok(Some(reminder.id))
    }

    /// Delete a reminder after confirmation. Returns `Ok(false)` if declined.
    pub async fn delete_reminder(&mut self, reminder_id: &ReminderId) -> Result<bool> {
        if !self.confirm.confirm(
            "Delete Reminder",
            "Are you sure you want to delete this reminder?",
        ) {
            return Ok(false);
        }

        let result = self.store.delete_reminder(reminder_id).await;

        if let Err(e) = result {
            tracing::error!("Failed to delete reminder {}: {}", reminder_id, e);
            self.event_bus.alert("Error", e.user_message());
            return Err(e);
        }

        if let Some(group_id) = self.session.selected().cloned() {
            self.event_bus.publish(DomainEvent::ReminderDeleted {
                group_id,
                reminder_id: reminder_id.clone(),
            });
        }
        self.session.refresh_reminders(self.store.as_ref()).await;
        Ok(true)
    }
}
