use thiserror::Error;

/// Message shown when a failure carries no usable text.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0} is already a member of this group")]
    AlreadyMember(String),

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error("Another operation is still in progress")]
    Busy,
}

impl DomainError {
    /// Text suitable for a blocking message to the user.
    ///
    /// Store failures carry the backend's message when there is one,
    /// otherwise the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(msg) | Self::Remote(msg) | Self::Config(msg) | Self::Conflict(msg) => {
                let msg = msg.trim();
                if msg.is_empty() {
                    GENERIC_FAILURE.to_string()
                } else {
                    msg.to_string()
                }
            }
            Self::NotFound(what) => format!("{} no longer exists", what),
            Self::Validation(msg) | Self::Forbidden(msg) => msg.clone(),
            Self::AlreadyMember(_) | Self::Busy => self.to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::AlreadyMember(_))
    }
}

impl From<rusqlite::Error> for DomainError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                DomainError::Conflict(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            _ => DomainError::Database(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        DomainError::Remote(err.to_string())
    }
}

impl From<mongodb::error::Error> for DomainError {
    fn from(err: mongodb::error::Error) -> Self {
        let msg = err.to_string();
        if msg.contains("E11000") {
            DomainError::Conflict(msg)
        } else {
            DomainError::Database(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_falls_back_to_generic() {
        assert_eq!(
            DomainError::Remote("  ".to_string()).user_message(),
            GENERIC_FAILURE
        );
        assert_eq!(
            DomainError::Database("permission denied for table groups".to_string()).user_message(),
            "permission denied for table groups"
        );
    }

    #[test]
    fn test_already_member_message() {
        let err = DomainError::AlreadyMember("a@x.com".to_string());
        assert_eq!(err.user_message(), "a@x.com is already a member of this group");
        assert!(err.is_conflict());
    }

    fn sqlite_failure(code: std::os::raw::c_int, msg: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), Some(msg.to_string()))
    }

    #[test]
    fn test_only_unique_sqlite_violations_are_conflicts() {
        let unique = DomainError::from(sqlite_failure(
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            "UNIQUE constraint failed: memberships.group_id, memberships.user_id",
        ));
        assert!(unique.is_conflict());

        for code in [
            rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            rusqlite::ffi::SQLITE_CONSTRAINT_CHECK,
        ] {
            let err = DomainError::from(sqlite_failure(code, "constraint failed"));
            assert!(!err.is_conflict(), "got {:?}", err);
            assert_eq!(err.user_message(), "constraint failed");
        }
    }
}
