use serde::{Deserialize, Serialize};

use super::model::{GroupId, ReminderId};

/// Domain events that represent state changes in the system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    /// The group list was replaced by a fresh fetch
    GroupsRefreshed { count: usize },

    /// A group became the current selection (`None` = deselected)
    GroupSelected { group_id: Option<GroupId> },

    /// Members and reminders of the selected group were replaced
    DetailRefreshed {
        group_id: GroupId,
        member_count: usize,
        reminder_count: usize,
    },

    /// Phase 1 of group creation committed
    GroupCreated { group_id: GroupId, name: String },

    /// Staged members were written at the end of group creation
    MembersCommitted {
        group_id: GroupId,
        added: usize,
        failed: usize,
    },

    MemberAdded { group_id: GroupId, email: String },

    MemberRemoved { group_id: GroupId },

    GroupLeft { group_id: GroupId },

    ReminderCreated {
        group_id: GroupId,
        reminder_id: ReminderId,
    },

    ReminderDeleted {
        group_id: GroupId,
        reminder_id: ReminderId,
    },

    /// Blocking message for the user
    Alert { title: String, message: String },
}

impl DomainEvent {
    /// Get the group ID associated with this event
    pub fn group_id(&self) -> Option<&GroupId> {
        match self {
            Self::GroupSelected { group_id } => group_id.as_ref(),
            Self::DetailRefreshed { group_id, .. }
            | Self::GroupCreated { group_id, .. }
            | Self::MembersCommitted { group_id, .. }
            | Self::MemberAdded { group_id, .. }
            | Self::MemberRemoved { group_id }
            | Self::GroupLeft { group_id }
            | Self::ReminderCreated { group_id, .. }
            | Self::ReminderDeleted { group_id, .. } => Some(group_id),
            Self::GroupsRefreshed { .. } | Self::Alert { .. } => None,
        }
    }

    /// Get the event type name for frontend routing
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::GroupsRefreshed { .. } => "groups_refreshed",
            Self::GroupSelected { .. } => "group_selected",
            Self::DetailRefreshed { .. } => "detail_refreshed",
            Self::GroupCreated { .. } => "group_created",
            Self::MembersCommitted { .. } => "members_committed",
            Self::MemberAdded { .. } => "member_added",
            Self::MemberRemoved { .. } => "member_removed",
            Self::GroupLeft { .. } => "group_left",
            Self::ReminderCreated { .. } => "reminder_created",
            Self::ReminderDeleted { .. } => "reminder_deleted",
            Self::Alert { .. } => "alert",
        }
    }
}
