use std::fmt;

use orgbase_store::StoreError;
use thiserror::Error;

use crate::directory::{ADMINS_UNIT, ORGANIZATIONS_UNIT};

/// Which uniqueness invariant a create or rename collided with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Organization name (or its derived storage unit id) is taken
    NameTaken,
    /// Admin email is taken, possibly by another organization
    EmailTaken,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::NameTaken => write!(f, "organization name already exists"),
            ConflictKind::EmailTaken => write!(f, "admin email already exists"),
        }
    }
}

/// Error taxonomy of the lifecycle core.
///
/// `Forbidden` is deliberately message-uniform: wrong admin, wrong
/// organization, and bad password all render identically to avoid account
/// enumeration. `Unauthenticated` likewise collapses expired and invalid
/// tokens into one caller-facing outcome.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("{0}")]
    Conflict(ConflictKind),

    #[error("organization not found")]
    NotFound,

    #[error("invalid admin credentials")]
    Forbidden,

    #[error("invalid or expired token")]
    Unauthenticated,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ControlError {
    fn from(err: StoreError) -> Self {
        match err {
            // The store's unique indexes are the authoritative uniqueness
            // check; in-process lookups are only advisory early exits.
            StoreError::UniqueViolation { ref unit, ref field }
                if unit == ORGANIZATIONS_UNIT && (field == "name" || field == "storage_unit_id") =>
            {
                ControlError::Conflict(ConflictKind::NameTaken)
            }
            StoreError::UniqueViolation { ref unit, ref field }
                if unit == ADMINS_UNIT && field == "email" =>
            {
                ControlError::Conflict(ConflictKind::EmailTaken)
            }
            other => ControlError::Internal(other.to_string()),
        }
    }
}

impl From<orgbase_auth::PasswordError> for ControlError {
    fn from(err: orgbase_auth::PasswordError) -> Self {
        // Hashing/format failures are internal problems, never a credential
        // mismatch.
        ControlError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ControlError {
    fn from(err: serde_json::Error) -> Self {
        ControlError::Internal(format!("directory document corrupt: {err}"))
    }
}
