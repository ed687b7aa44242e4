use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{AccountId, GroupId};

/// Group entity - a named collection of accounts sharing reminders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: AccountId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Insert payload for the `groups` resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_by: AccountId,
}

impl NewGroup {
    /// Build from raw form input. Returns `None` when the trimmed name is empty;
    /// an all-whitespace description becomes absent.
    pub fn from_input(name: &str, description: &str, created_by: AccountId) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            description: non_empty(description),
            created_by,
        })
    }
}

/// Group as shown in the group list, with counts derived from related rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    #[serde(flatten)]
    pub group: Group,
    pub member_count: usize,
    pub reminder_count: usize,
}

impl GroupSummary {
    pub fn id(&self) -> &GroupId {
        &self.group.id
    }
}

/// Trim `value`, mapping an empty result to `None`.
pub fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_group_trims_input() {
        let group = NewGroup::from_input("  Family Fitness ", "   ", AccountId::from("u1")).unwrap();
        assert_eq!(group.name, "Family Fitness");
        assert_eq!(group.description, None);

        let group = NewGroup::from_input("Study", " weekly sessions ", AccountId::from("u1")).unwrap();
        assert_eq!(group.description.as_deref(), Some("weekly sessions"));
    }

    #[test]
    fn test_new_group_rejects_blank_name() {
        assert!(NewGroup::from_input("", "desc", AccountId::from("u1")).is_none());
        assert!(NewGroup::from_input(" \t\n", "", AccountId::from("u1")).is_none());
    }

    #[test]
    fn test_description_omitted_from_insert_payload() {
        let group = NewGroup::from_input("Book club", "", AccountId::from("u1")).unwrap();
        let json = serde_json::to_value(&group).unwrap();
        assert!(json.get("description").is_none());
        assert_eq!(json["created_by"], "u1");
    }
}
