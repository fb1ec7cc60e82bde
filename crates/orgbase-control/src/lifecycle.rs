//! Tenant lifecycle manager: create, rename-with-migration, delete
//!
//! State machine per organization: absent → active → (renaming) → active →
//! deleted. "Renaming" is transient and never durable: the directory update
//! in step 6 of [`LifecycleManager::rename`] is the single durability point,
//! and every failure before it leaves the old storage unit authoritative.

use std::sync::Arc;

use chrono::Utc;
use orgbase_auth::{hash_password, verify_password, OrgClaims};
use orgbase_store::{StorageDriver, StoreError};
use serde_json::json;
use tracing::{error, info, warn};

use crate::authz::{Access, AuthorizationGate};
use crate::directory::TenantDirectory;
use crate::error::{ConflictKind, ControlError};
use crate::model::{Admin, Organization};
use crate::sanitize;

/// Orchestrates lifecycle transitions across the tenant directory and the
/// per-tenant storage units.
///
/// Stateless besides its handles: safe to share across request tasks and to
/// run in multiple process instances, since uniqueness is enforced by the
/// store's indexes rather than in-process locking.
pub struct LifecycleManager {
    store: Arc<dyn StorageDriver>,
    directory: TenantDirectory,
}

impl LifecycleManager {
    pub fn new(store: Arc<dyn StorageDriver>) -> Self {
        let directory = TenantDirectory::new(store.clone());
        Self { store, directory }
    }

    /// Declare directory indexes. Must run before serving requests.
    pub async fn bootstrap(&self) -> Result<(), ControlError> {
        self.directory.bootstrap().await
    }

    /// Create an organization together with its admin and storage unit.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Organization, ControlError> {
        // Advisory early exits; the unique indexes remain authoritative and
        // a lost race below surfaces the same conflict.
        if self.directory.lookup(name).await?.is_some() {
            return Err(ControlError::Conflict(ConflictKind::NameTaken));
        }
        if self.directory.find_admin(email).await?.is_some() {
            return Err(ControlError::Conflict(ConflictKind::EmailTaken));
        }

        let password_hash = hash_password(password)?;
        let storage_unit_id = sanitize::storage_unit_id(name);

        let org = Organization::new(name, &storage_unit_id);
        let admin = Admin::new(email, password_hash, &org);

        self.directory.insert(&org, &admin).await?;

        if let Err(err) = self.seed_storage_unit(&storage_unit_id).await {
            // The directory entry exists but the tenant has no usable unit.
            // Roll it back so a retry is not blocked by a spurious conflict.
            error!(
                organization = name,
                storage_unit = %storage_unit_id,
                error = %err,
                "storage unit creation failed after directory insert; rolling back"
            );
            if let Err(undo) = self.directory.remove(name).await {
                warn!(
                    organization = name,
                    error = %undo,
                    "rollback of directory entry failed; reconciliation candidate"
                );
            }
            if let Err(undo) = self.directory.remove_admins(name).await {
                warn!(
                    organization = name,
                    error = %undo,
                    "rollback of admin record failed; reconciliation candidate"
                );
            }
            return Err(ControlError::Internal(err.to_string()));
        }

        info!(
            organization = name,
            storage_unit = %storage_unit_id,
            "organization created"
        );
        Ok(org)
    }

    async fn seed_storage_unit(&self, unit_id: &str) -> Result<(), StoreError> {
        self.store.create_unit(unit_id).await?;
        // Marker document: lets existence be probed through find_all without
        // a separate unit-list capability.
        self.store
            .insert_one(
                unit_id,
                json!({
                    "type": "initialization",
                    "initialized": true,
                    "created_at": Utc::now(),
                }),
            )
            .await
    }

    /// Pure lookup of an organization's directory entry.
    pub async fn get(&self, name: &str) -> Result<Organization, ControlError> {
        self.directory
            .lookup(name)
            .await?
            .ok_or(ControlError::NotFound)
    }

    /// Verify admin login credentials. Unknown email and wrong password are
    /// reported identically.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Admin, ControlError> {
        let admin = self
            .directory
            .find_admin(email)
            .await?
            .ok_or(ControlError::Unauthenticated)?;

        if !verify_password(password, &admin.password_hash)? {
            return Err(ControlError::Unauthenticated);
        }

        Ok(admin)
    }

    /// Ownership check for rename. Wrong admin, wrong organization, and bad
    /// password must all be reported identically.
    async fn verify_owner(
        &self,
        org: &Organization,
        email: &str,
        password: &str,
    ) -> Result<(), ControlError> {
        let Some(admin) = self.directory.find_admin(email).await? else {
            return Err(ControlError::Forbidden);
        };
        if admin.organization_name != org.name {
            return Err(ControlError::Forbidden);
        }
        if !verify_password(password, &admin.password_hash)? {
            return Err(ControlError::Forbidden);
        }
        Ok(())
    }

    /// Rename an organization, migrating its documents to a fresh storage
    /// unit derived from the new name.
    pub async fn rename(
        &self,
        old_name: &str,
        new_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Organization, ControlError> {
        let org = self.get(old_name).await?;
        self.verify_owner(&org, email, password).await?;

        // The organization itself owns old_name, so renaming to the same
        // name conflicts too; this also rules out copying a unit onto itself.
        if self.directory.lookup(new_name).await?.is_some() {
            return Err(ControlError::Conflict(ConflictKind::NameTaken));
        }

        let new_unit_id = sanitize::storage_unit_id(new_name);

        if new_unit_id == org.storage_unit_id {
            // Sanitization maps the new name onto the unit this organization
            // already owns; there is nothing to migrate, only the directory
            // entry changes.
            self.directory
                .rename_entry(old_name, new_name, &new_unit_id)
                .await?;
            info!(
                old_name,
                new_name,
                storage_unit = %new_unit_id,
                "organization renamed"
            );
            return self.get(new_name).await;
        }

        // The derived unit may belong to another organization whose name
        // sanitizes the same way. That must be rejected before the migration
        // writes into the foreign tenant's unit. Advisory like the name
        // check above; the storage_unit_id unique index at the directory
        // update remains authoritative.
        if self.directory.lookup_by_unit(&new_unit_id).await?.is_some() {
            return Err(ControlError::Conflict(ConflictKind::NameTaken));
        }

        // Migrate first. Any failure up to the directory update leaves the
        // old unit authoritative and the rename safe to retry.
        self.store
            .create_unit(&new_unit_id)
            .await
            .map_err(internal)?;
        let docs = self
            .store
            .find_all(&org.storage_unit_id)
            .await
            .map_err(internal)?;
        if !docs.is_empty() {
            self.store
                .insert_many(&new_unit_id, docs)
                .await
                .map_err(internal)?;
        }

        // Durability point: once acknowledged, the rename is committed.
        self.directory
            .rename_entry(old_name, new_name, &new_unit_id)
            .await?;

        if let Err(err) = self.store.drop_unit(&org.storage_unit_id).await {
            // The directory no longer references the old unit; it is inert
            // but leaked until an operator reclaims it.
            warn!(
                organization = new_name,
                orphaned_unit = %org.storage_unit_id,
                error = %err,
                "failed to drop old storage unit after rename; reconciliation candidate"
            );
        }

        info!(
            old_name,
            new_name,
            storage_unit = %new_unit_id,
            "organization renamed"
        );
        self.get(new_name).await
    }

    /// Delete an organization. The caller's token must be scoped to this
    /// very organization.
    pub async fn delete(&self, name: &str, claims: &OrgClaims) -> Result<(), ControlError> {
        // Lookup precedes the gate so a missing organization reports
        // NotFound, matching rename's behavior.
        let org = self.get(name).await?;

        if AuthorizationGate::authorize(claims, name) == Access::Denied {
            return Err(ControlError::Forbidden);
        }

        // Drop the bulk data first: a crash after this leaves at worst an
        // orphaned directory entry, never an entry pointing at a vanished
        // unit that silently reads empty.
        match self.store.drop_unit(&org.storage_unit_id).await {
            Ok(()) => {}
            Err(StoreError::UnitNotFound(unit)) => {
                // Unit already missing (e.g. a create whose rollback failed).
                // Deleting the entry is still the right cleanup.
                warn!(
                    organization = name,
                    storage_unit = %unit,
                    "storage unit missing at delete; removing directory entry anyway"
                );
            }
            Err(err) => return Err(internal(err)),
        }

        self.directory.remove(name).await?;
        self.directory.remove_admins(name).await?;

        info!(organization = name, "organization deleted");
        Ok(())
    }
}

fn internal(err: StoreError) -> ControlError {
    ControlError::Internal(err.to_string())
}
