//! Directory records for organizations and their admins

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed role of the single credential holder per organization
pub const ADMIN_ROLE: &str = "admin";

/// Organization lifecycle status. There is no soft-delete retention window:
/// a deleted organization's directory entry is removed outright, so `Deleted`
/// only ever appears on records in flight, never at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgStatus {
    Active,
    Deleted,
}

/// One tenant: the authoritative directory entry mapping a human-chosen name
/// to its dedicated storage unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    /// Stable identity; survives renames
    pub id: String,
    /// Human-chosen name, unique among active organizations (case-sensitive)
    pub name: String,
    /// Derived identifier of the tenant's storage unit; changes only as part
    /// of a rename transition
    pub storage_unit_id: String,
    pub status: OrgStatus,
    pub created_at: DateTime<Utc>,
    /// Bumped on every successful lifecycle transition, including rename
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(name: &str, storage_unit_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            storage_unit_id: storage_unit_id.to_string(),
            status: OrgStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The single credential holder for an organization. Created atomically with
/// its organization and deleted with it; the organization fields are a weak
/// back-reference used for lookup only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    /// Login identifier, globally unique across all organizations
    pub email: String,
    /// PHC-formatted Argon2id hash; the plaintext is never stored
    pub password_hash: String,
    pub organization_id: String,
    pub organization_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl Admin {
    pub fn new(email: &str, password_hash: String, org: &Organization) -> Self {
        Self {
            email: email.to_string(),
            password_hash,
            organization_id: org.id.clone(),
            organization_name: org.name.clone(),
            role: ADMIN_ROLE.to_string(),
            created_at: Utc::now(),
        }
    }
}
