use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

use super::{AccountId, GroupId, MembershipId};
use crate::domain::error::DomainError;

/// Membership role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(DomainError::Validation(format!("unknown role: {}", other))),
        }
    }
}

/// Relation between one account and one group.
///
/// `email` and `name` are captured when the member is added and are not
/// kept in sync with the account profile afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub group_id: GroupId,
    pub user_id: AccountId,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
}

impl Membership {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Display name falling back to the email address
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Insert payload for the `memberships` resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMembership {
    pub group_id: GroupId,
    pub user_id: AccountId,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
}

impl NewMembership {
    pub fn new(group_id: GroupId, profile: &AccountProfile, role: Role) -> Self {
        Self {
            group_id,
            user_id: profile.id.clone(),
            email: profile.email.clone(),
            name: profile.name.clone(),
            role,
        }
    }
}

/// Account profile as returned by the account directory.
///
/// Also the shape of a pending member while it sits in the staging set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: AccountId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl AccountProfile {
    pub fn new(id: impl Into<AccountId>, email: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.map(str::to_string),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Member.to_string(), "member");
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_new_membership_copies_profile() {
        let profile = AccountProfile::new("u2", "a@x.com", None);
        let row = NewMembership::new(GroupId::from("g1"), &profile, Role::Member);
        assert_eq!(row.user_id.as_str(), "u2");
        assert_eq!(row.email, "a@x.com");

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["role"], "member");
        assert!(json.get("name").is_none());
    }
}
