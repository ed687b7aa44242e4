use std::fmt;

use serde::Serialize;

use crate::domain::error::{DomainError, GENERIC_FAILURE};

/// Error as shown to the user
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError {
            message: err.user_message(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(domain) = err.downcast_ref::<DomainError>() {
            return ApiError {
                message: domain.user_message(),
            };
        }

        let message = format!("{:#}", err);
        ApiError {
            message: if message.trim().is_empty() {
                GENERIC_FAILURE.to_string()
            } else {
                message
            },
        }
    }
}

impl From<ApiError> for String {
    fn from(err: ApiError) -> Self {
        err.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_uses_user_message() {
        let err = ApiError::from(DomainError::Remote(String::new()));
        assert_eq!(err.message, GENERIC_FAILURE);

        let err = ApiError::from(DomainError::AlreadyMember("a@x.com".to_string()));
        assert_eq!(err.to_string(), "a@x.com is already a member of this group");
    }

    #[test]
    fn test_anyhow_error_keeps_context() {
        let err = anyhow::anyhow!("no such file").context("Failed to open database");
        let err = ApiError::from(err);
        assert_eq!(err.message, "Failed to open database: no such file");

        let err = ApiError::from(anyhow::Error::from(DomainError::Busy));
        assert_eq!(err.message, "Another operation is still in progress");
    }
}
