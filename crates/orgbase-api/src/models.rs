use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to create an organization with its initial admin
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrganizationRequest {
    /// Human-chosen organization name (3-50 characters)
    pub organization_name: String,
    /// Admin email, globally unique
    pub email: String,
    /// Admin password (minimum 8 characters)
    pub password: String,
}

/// Result of a successful organization creation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrganizationResponse {
    /// Stable organization identifier
    pub organization_id: String,
    pub organization_name: String,
    /// Identifier of the dedicated storage unit derived from the name
    pub storage_unit_id: String,
    pub admin_email: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of an organization's directory entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationInfo {
    pub organization_id: String,
    pub organization_name: String,
    pub storage_unit_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to rename an organization. The admin credentials prove ownership.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenameOrganizationRequest {
    /// New organization name (3-50 characters)
    pub new_organization_name: String,
    /// Admin email of the organization being renamed
    pub email: String,
    /// Admin password
    pub password: String,
}

/// Result of a successful rename
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenameOrganizationResponse {
    pub organization_id: String,
    pub organization_name: String,
    /// Storage unit derived from the new name; tenant documents have been
    /// migrated into it
    pub storage_unit_id: String,
    pub updated_at: DateTime<Utc>,
}

/// Admin login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued access token, scoped to the admin's organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
    /// Token expiry as a unix timestamp
    pub expires_at: i64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: Some(code.to_string()),
        }
    }
}
