//! Storage driver trait

use async_trait::async_trait;

use crate::error::StoreError;

/// A single schemaless document
pub type Document = serde_json::Value;

/// Contract the tenant lifecycle manager consumes from the shared cluster.
///
/// Units are named containers of documents. The driver must provide
/// at-least read-your-writes consistency, and writes against a declared
/// unique index must be atomic: two concurrent inserts of the same key
/// yield exactly one success and one `UniqueViolation`.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Create an empty storage unit. Creating a unit that already exists is
    /// a no-op, matching document-store semantics.
    async fn create_unit(&self, unit: &str) -> Result<(), StoreError>;

    /// Drop a storage unit and all of its documents
    async fn drop_unit(&self, unit: &str) -> Result<(), StoreError>;

    /// Insert one document, enforcing the unit's unique indexes
    async fn insert_one(&self, unit: &str, doc: Document) -> Result<(), StoreError>;

    /// Bulk-insert documents in order. All-or-nothing with respect to the
    /// unit's unique indexes.
    async fn insert_many(&self, unit: &str, docs: Vec<Document>) -> Result<(), StoreError>;

    /// All documents in insertion order
    async fn find_all(&self, unit: &str) -> Result<Vec<Document>, StoreError>;

    /// First document whose string field equals `value`
    async fn find_one(
        &self,
        unit: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// Merge `patch`'s top-level keys into the first document whose string
    /// field equals `value`. Returns false when nothing matched. Patched
    /// fields are re-checked against the unit's unique indexes.
    async fn update_one(
        &self,
        unit: &str,
        field: &str,
        value: &str,
        patch: Document,
    ) -> Result<bool, StoreError>;

    /// Delete the first matching document; returns false when nothing matched
    async fn delete_one(&self, unit: &str, field: &str, value: &str)
        -> Result<bool, StoreError>;

    /// Delete every matching document; returns the number removed
    async fn delete_many(&self, unit: &str, field: &str, value: &str)
        -> Result<u64, StoreError>;

    /// Declare a unique index on a string field, creating the unit if it
    /// does not exist yet. Invoked at startup for the directory units.
    async fn ensure_unique_index(&self, unit: &str, field: &str) -> Result<(), StoreError>;
}
