//! Shared primitives for all Rust crates in Brandroom.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;
/// Quota decision payloads shared by the limit error kinds.
pub mod quota;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use auth::UserIdentity;
pub use quota::LimitDecision;

/// Result type used across Brandroom crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a random ", $label, " identifier.")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Creates a ", $label, " identifier from an existing UUID value.")]
            #[must_use]
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            #[doc = concat!("Parses a ", $label, " identifier from its transport form.")]
            pub fn parse(value: &str) -> AppResult<Self> {
                Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
                    AppError::Validation(format!(
                        concat!("invalid ", $label, " id '{}': {}"),
                        value, error
                    ))
                })
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Workspace identifier used as the partition key for every persisted resource.
    WorkspaceId,
    "workspace"
);

uuid_identifier!(
    /// Stable user identifier issued by the identity collaborator.
    UserId,
    "user"
);

uuid_identifier!(
    /// Brand identifier; brands scope social accounts inside a workspace.
    BrandId,
    "brand"
);

uuid_identifier!(
    /// Identifier of a persisted workspace role row.
    RoleId,
    "role"
);

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// User is not authenticated or not allowed to access a resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Subscription quota would be exceeded by the requested operation.
    #[error("limit exceeded: {0}")]
    LimitExceeded(Box<LimitDecision>),

    /// Limit key is not part of the plan catalog; a wiring defect.
    #[error("unsupported limit: {0}")]
    UnsupportedLimit(String),

    /// Brand referenced as a quota scope does not exist.
    #[error("brand not found: {0}")]
    BrandNotFound(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns whether this error is one of the quota enforcement kinds.
    #[must_use]
    pub fn is_limit_error(&self) -> bool {
        matches!(
            self,
            Self::LimitExceeded(_) | Self::UnsupportedLimit(_) | Self::BrandNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, LimitDecision, NonEmptyString, WorkspaceId};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn workspace_id_formats_as_uuid() {
        let workspace_id = WorkspaceId::new();
        assert_eq!(workspace_id.to_string().len(), 36);
    }

    #[test]
    fn workspace_id_parse_rejects_garbage() {
        assert!(WorkspaceId::parse("not-a-uuid").is_err());

        let workspace_id = WorkspaceId::new();
        let parsed = WorkspaceId::parse(workspace_id.to_string().as_str());
        assert_eq!(parsed.ok(), Some(workspace_id));
    }

    #[test]
    fn limit_kinds_are_classified() {
        let exceeded = AppError::LimitExceeded(Box::new(LimitDecision {
            limit_key: "brand.maxCount".to_owned(),
            plan: "free".to_owned(),
            limit: 1,
            current: 1,
            requested_amount: 1,
        }));

        assert!(exceeded.is_limit_error());
        assert!(AppError::UnsupportedLimit("x".to_owned()).is_limit_error());
        assert!(AppError::BrandNotFound("x".to_owned()).is_limit_error());
        assert!(!AppError::NotFound("x".to_owned()).is_limit_error());
    }
}
