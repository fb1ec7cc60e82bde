//! Tenant lifecycle core for the organization management service
//!
//! Owns the tenant directory, the create/rename/delete orchestration over
//! per-tenant storage units, and the authorization gate. The HTTP surface
//! and the storage backend are collaborators behind seams (`orgbase-api`
//! and the `StorageDriver` trait).

pub mod authz;
pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod sanitize;

pub use authz::{Access, AuthorizationGate};
pub use directory::TenantDirectory;
pub use error::{ConflictKind, ControlError};
pub use lifecycle::LifecycleManager;
pub use model::{Admin, OrgStatus, Organization, ADMIN_ROLE};
pub use sanitize::storage_unit_id;
