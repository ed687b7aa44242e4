use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::macros::format_description;
use time::{OffsetDateTime, Time};

use super::group::non_empty;
use super::{AccountId, GroupId, ReminderId};
use crate::domain::error::DomainError;

/// Scheduled time of day, stored as `HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay(Time);

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, DomainError> {
        Time::from_hms(hour, minute, 0)
            .map(Self)
            .map_err(|e| DomainError::Validation(format!("invalid time: {}", e)))
    }

    /// Storage form, e.g. `09:00:00`
    pub fn to_storage(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            self.0.hour(),
            self.0.minute(),
            self.0.second()
        )
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = DomainError;

    /// Accepts `HH:MM` or `HH:MM:SS`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = if s.len() > 5 {
            Time::parse(s, format_description!("[hour]:[minute]:[second]"))
        } else {
            Time::parse(s, format_description!("[hour]:[minute]"))
        };

        parsed
            .map(Self)
            .map_err(|e| DomainError::Validation(format!("invalid time '{}': {}", s, e)))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_storage())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Repeat policy for a group reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    Once,
    Daily,
    Weekly,
}

impl Repeat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Repeat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "once" => Ok(Self::Once),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            other => Err(DomainError::Validation(format!(
                "unknown repeat policy: {}",
                other
            ))),
        }
    }
}

/// Reminder scoped to a group, visible to all of its members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReminder {
    pub id: ReminderId,
    pub group_id: GroupId,
    pub title: String,
    pub why: Option<String>,
    pub time: TimeOfDay,
    pub repeat: Repeat,
    pub active: bool,
    pub created_by: AccountId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Insert payload for the `group_reminders` resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewGroupReminder {
    pub group_id: GroupId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why: Option<String>,
    pub time: TimeOfDay,
    pub repeat: Repeat,
    pub active: bool,
    pub created_by: AccountId,
}

/// Reminder creation form
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReminderDraft {
    pub title: String,
    pub why: String,
    pub time: Option<TimeOfDay>,
    pub repeat: Repeat,
}

impl ReminderDraft {
    pub fn new(title: &str, time: TimeOfDay, repeat: Repeat) -> Self {
        Self {
            title: title.to_string(),
            why: String::new(),
            time: Some(time),
            repeat,
        }
    }

    pub fn with_why(mut self, why: &str) -> Self {
        self.why = why.to_string();
        self
    }

    /// Build the insert payload. `None` when the trimmed title is empty or no
    /// time has been picked.
    pub fn to_insert(&self, group_id: GroupId, created_by: AccountId) -> Option<NewGroupReminder> {
        let title = non_empty(&self.title)?;
        let time = self.time?;

        Some(NewGroupReminder {
            group_id,
            title,
            why: non_empty(&self.why),
            time,
            repeat: self.repeat,
            active: true,
            created_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_parses_both_forms() {
        let short: TimeOfDay = "09:00".parse().unwrap();
        let long: TimeOfDay = "09:00:00".parse().unwrap();
        assert_eq!(short, long);
        assert_eq!(short.to_string(), "09:00");
        assert_eq!(short.to_storage(), "09:00:00");
        assert!("25:00".parse::<TimeOfDay>().is_err());
        assert!("nine".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_time_of_day_orders_chronologically() {
        let early: TimeOfDay = "07:30".parse().unwrap();
        let late: TimeOfDay = "18:05".parse().unwrap();
        assert!(early < late);
    }

    #[test]
    fn test_draft_requires_title() {
        let time = TimeOfDay::new(9, 0).unwrap();
        let draft = ReminderDraft::new("   ", time, Repeat::Daily);
        assert!(draft.to_insert(GroupId::from("g"), AccountId::from("u")).is_none());

        let draft = ReminderDraft::new(" Stretch ", time, Repeat::Daily).with_why("  ");
        let row = draft
            .to_insert(GroupId::from("g"), AccountId::from("u"))
            .unwrap();
        assert_eq!(row.title, "Stretch");
        assert_eq!(row.why, None);
        assert!(row.active);
    }

    #[test]
    fn test_reminder_serializes_storage_shape() {
        let row = NewGroupReminder {
            group_id: GroupId::from("g"),
            title: "Walk".to_string(),
            why: None,
            time: "09:00".parse().unwrap(),
            repeat: Repeat::Weekly,
            active: true,
            created_by: AccountId::from("u"),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["time"], "09:00:00");
        assert_eq!(json["repeat"], "weekly");
    }
}
