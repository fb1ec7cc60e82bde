//! In-memory storage driver
//!
//! Backs the server in single-process deployments and the test suite.
//! Every mutation takes the single write lock for its full duration, so
//! unique-index checks and the commit are serialized: concurrent inserts of
//! the same key cannot both succeed.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::driver::{Document, StorageDriver};
use crate::error::StoreError;

#[derive(Default)]
struct Unit {
    docs: Vec<Document>,
    unique: BTreeSet<String>,
}

impl Unit {
    fn check_unique(&self, doc: &Document, skip: Option<usize>) -> Result<(), (String,)> {
        for field in &self.unique {
            let Some(value) = field_str(doc, field) else {
                continue;
            };
            let taken = self
                .docs
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != skip)
                .any(|(_, existing)| field_str(existing, field) == Some(value));
            if taken {
                return Err((field.clone(),));
            }
        }
        Ok(())
    }
}

fn field_str<'a>(doc: &'a Document, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(|v| v.as_str())
}

/// In-memory `StorageDriver` implementation
#[derive(Default)]
pub struct MemoryStore {
    units: RwLock<HashMap<String, Unit>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageDriver for MemoryStore {
    async fn create_unit(&self, unit: &str) -> Result<(), StoreError> {
        let mut units = self.units.write().await;
        units.entry(unit.to_string()).or_default();
        Ok(())
    }

    async fn drop_unit(&self, unit: &str) -> Result<(), StoreError> {
        let mut units = self.units.write().await;
        if units.remove(unit).is_none() {
            return Err(StoreError::UnitNotFound(unit.to_string()));
        }
        debug!(unit, "dropped storage unit");
        Ok(())
    }

    async fn insert_one(&self, unit: &str, doc: Document) -> Result<(), StoreError> {
        let mut units = self.units.write().await;
        let entry = units
            .get_mut(unit)
            .ok_or_else(|| StoreError::UnitNotFound(unit.to_string()))?;

        entry
            .check_unique(&doc, None)
            .map_err(|(field,)| StoreError::UniqueViolation {
                unit: unit.to_string(),
                field,
            })?;

        entry.docs.push(doc);
        Ok(())
    }

    async fn insert_many(&self, unit: &str, docs: Vec<Document>) -> Result<(), StoreError> {
        let mut units = self.units.write().await;
        let entry = units
            .get_mut(unit)
            .ok_or_else(|| StoreError::UnitNotFound(unit.to_string()))?;

        // Validate the whole batch, including duplicates within it, before
        // committing anything.
        for (i, doc) in docs.iter().enumerate() {
            entry
                .check_unique(doc, None)
                .map_err(|(field,)| StoreError::UniqueViolation {
                    unit: unit.to_string(),
                    field,
                })?;
            for field in &entry.unique {
                let Some(value) = field_str(doc, field) else {
                    continue;
                };
                if docs[..i]
                    .iter()
                    .any(|earlier| field_str(earlier, field) == Some(value))
                {
                    return Err(StoreError::UniqueViolation {
                        unit: unit.to_string(),
                        field: field.clone(),
                    });
                }
            }
        }

        entry.docs.extend(docs);
        Ok(())
    }

    async fn find_all(&self, unit: &str) -> Result<Vec<Document>, StoreError> {
        let units = self.units.read().await;
        let entry = units
            .get(unit)
            .ok_or_else(|| StoreError::UnitNotFound(unit.to_string()))?;
        Ok(entry.docs.clone())
    }

    async fn find_one(
        &self,
        unit: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, StoreError> {
        let units = self.units.read().await;
        let entry = units
            .get(unit)
            .ok_or_else(|| StoreError::UnitNotFound(unit.to_string()))?;
        Ok(entry
            .docs
            .iter()
            .find(|doc| field_str(doc, field) == Some(value))
            .cloned())
    }

    async fn update_one(
        &self,
        unit: &str,
        field: &str,
        value: &str,
        patch: Document,
    ) -> Result<bool, StoreError> {
        let mut units = self.units.write().await;
        let entry = units
            .get_mut(unit)
            .ok_or_else(|| StoreError::UnitNotFound(unit.to_string()))?;

        let Some(pos) = entry
            .docs
            .iter()
            .position(|doc| field_str(doc, field) == Some(value))
        else {
            return Ok(false);
        };

        let mut patched = entry.docs[pos].clone();
        if let (Some(target), Some(changes)) = (patched.as_object_mut(), patch.as_object()) {
            for (k, v) in changes {
                target.insert(k.clone(), v.clone());
            }
        } else {
            return Err(StoreError::Backend(
                "update_one requires object documents".to_string(),
            ));
        }

        entry
            .check_unique(&patched, Some(pos))
            .map_err(|(field,)| StoreError::UniqueViolation {
                unit: unit.to_string(),
                field,
            })?;

        entry.docs[pos] = patched;
        Ok(true)
    }

    async fn delete_one(
        &self,
        unit: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        let mut units = self.units.write().await;
        let entry = units
            .get_mut(unit)
            .ok_or_else(|| StoreError::UnitNotFound(unit.to_string()))?;

        match entry
            .docs
            .iter()
            .position(|doc| field_str(doc, field) == Some(value))
        {
            Some(pos) => {
                entry.docs.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_many(
        &self,
        unit: &str,
        field: &str,
        value: &str,
    ) -> Result<u64, StoreError> {
        let mut units = self.units.write().await;
        let entry = units
            .get_mut(unit)
            .ok_or_else(|| StoreError::UnitNotFound(unit.to_string()))?;

        let before = entry.docs.len();
        entry.docs.retain(|doc| field_str(doc, field) != Some(value));
        Ok((before - entry.docs.len()) as u64)
    }

    async fn ensure_unique_index(&self, unit: &str, field: &str) -> Result<(), StoreError> {
        let mut units = self.units.write().await;
        let entry = units.entry(unit.to_string()).or_default();
        entry.unique.insert(field.to_string());
        debug!(unit, field, "declared unique index");
        Ok(())
    }
}
