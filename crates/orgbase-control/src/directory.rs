//! Tenant directory: the authoritative catalog of organizations and admins

use std::sync::Arc;

use chrono::Utc;
use orgbase_store::StorageDriver;
use serde_json::json;
use tracing::{info, warn};

use crate::error::ControlError;
use crate::model::{Admin, Organization};

/// Directory unit holding one document per organization
pub const ORGANIZATIONS_UNIT: &str = "organizations";
/// Directory unit holding one document per admin
pub const ADMINS_UNIT: &str = "admins";

/// Durable key-value catalog keyed by organization name.
///
/// Uniqueness of `name`, `storage_unit_id`, and admin `email` is enforced by
/// the store's unique indexes declared in [`TenantDirectory::bootstrap`]; the
/// directory never relies on a bare check-then-insert.
#[derive(Clone)]
pub struct TenantDirectory {
    store: Arc<dyn StorageDriver>,
}

impl TenantDirectory {
    pub fn new(store: Arc<dyn StorageDriver>) -> Self {
        Self { store }
    }

    /// Declare the uniqueness constraints backing the global invariants.
    /// Runs once at process startup, before any request is served.
    pub async fn bootstrap(&self) -> Result<(), ControlError> {
        self.store
            .ensure_unique_index(ORGANIZATIONS_UNIT, "name")
            .await?;
        self.store
            .ensure_unique_index(ORGANIZATIONS_UNIT, "storage_unit_id")
            .await?;
        self.store.ensure_unique_index(ADMINS_UNIT, "email").await?;
        info!("tenant directory indexes declared");
        Ok(())
    }

    pub async fn lookup(&self, name: &str) -> Result<Option<Organization>, ControlError> {
        let doc = self.store.find_one(ORGANIZATIONS_UNIT, "name", name).await?;
        Ok(doc.map(serde_json::from_value).transpose()?)
    }

    /// Reverse lookup: which organization currently owns a storage unit.
    pub async fn lookup_by_unit(
        &self,
        storage_unit_id: &str,
    ) -> Result<Option<Organization>, ControlError> {
        let doc = self
            .store
            .find_one(ORGANIZATIONS_UNIT, "storage_unit_id", storage_unit_id)
            .await?;
        Ok(doc.map(serde_json::from_value).transpose()?)
    }

    /// Insert an organization and its admin as a unit.
    ///
    /// The two inserts are not one storage transaction; if the admin insert
    /// loses a uniqueness race the organization entry is removed again before
    /// the conflict is surfaced, so no half-created tenant remains visible.
    pub async fn insert(&self, org: &Organization, admin: &Admin) -> Result<(), ControlError> {
        let org_doc = serde_json::to_value(org)?;
        let admin_doc = serde_json::to_value(admin)?;

        self.store.insert_one(ORGANIZATIONS_UNIT, org_doc).await?;

        if let Err(err) = self.store.insert_one(ADMINS_UNIT, admin_doc).await {
            if let Err(undo) = self
                .store
                .delete_one(ORGANIZATIONS_UNIT, "name", &org.name)
                .await
            {
                warn!(
                    organization = %org.name,
                    error = %undo,
                    "failed to undo organization insert; reconciliation candidate"
                );
            }
            return Err(err.into());
        }

        Ok(())
    }

    /// Commit a rename: repoint the entry at the new name and storage unit
    /// and bump `updated_at`. This single write is the rename's durability
    /// point. The admin's back-reference follows in a second write.
    pub async fn rename_entry(
        &self,
        old_name: &str,
        new_name: &str,
        new_storage_unit_id: &str,
    ) -> Result<(), ControlError> {
        let patch = json!({
            "name": new_name,
            "storage_unit_id": new_storage_unit_id,
            "updated_at": Utc::now(),
        });

        let matched = self
            .store
            .update_one(ORGANIZATIONS_UNIT, "name", old_name, patch)
            .await?;
        if !matched {
            return Err(ControlError::NotFound);
        }

        self.store
            .update_one(
                ADMINS_UNIT,
                "organization_name",
                old_name,
                json!({ "organization_name": new_name }),
            )
            .await?;

        Ok(())
    }

    pub async fn remove(&self, name: &str) -> Result<(), ControlError> {
        let matched = self
            .store
            .delete_one(ORGANIZATIONS_UNIT, "name", name)
            .await?;
        if !matched {
            return Err(ControlError::NotFound);
        }
        Ok(())
    }

    pub async fn find_admin(&self, email: &str) -> Result<Option<Admin>, ControlError> {
        let doc = self.store.find_one(ADMINS_UNIT, "email", email).await?;
        Ok(doc.map(serde_json::from_value).transpose()?)
    }

    pub async fn remove_admins(&self, org_name: &str) -> Result<u64, ControlError> {
        Ok(self
            .store
            .delete_many(ADMINS_UNIT, "organization_name", org_name)
            .await?)
    }
}
