//! Identity map store — the durable cross-store id association.
//!
//! One [`IdentityMapping`] ties a relational id to a document-store id for
//! a single logical entity. Both halves of the pair are unique per entity
//! type, a mapping is created at most once, and the engine never deletes
//! one — only `updated_at` ever changes, through [`MappingStore::touch`].
//!
//! The file-backed variant persists a `MappingFile` JSON document with the
//! same atomic `.tmp` + rename pattern as the store adapters.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use passerelle_core::types::{EntityType, ExternalId};

use crate::error::{io_err, SyncError};

/// Durable association between a relational id and a document-store id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMapping {
    pub entity_type: EntityType,
    pub relational_id: i64,
    pub external_id: ExternalId,
    /// Last time any sync direction touched this mapping.
    pub updated_at: DateTime<Utc>,
}

/// Contract every mapping store backend implements.
pub trait MappingStore {
    fn find_by_relational_id(
        &self,
        entity_type: EntityType,
        relational_id: i64,
    ) -> Result<Option<IdentityMapping>, SyncError>;

    fn find_by_external_id(
        &self,
        entity_type: EntityType,
        external_id: &ExternalId,
    ) -> Result<Option<IdentityMapping>, SyncError>;

    /// Fails with [`SyncError::DuplicateMapping`] if either half of the pair
    /// already exists for this entity type.
    fn create(
        &mut self,
        entity_type: EntityType,
        relational_id: i64,
        external_id: ExternalId,
    ) -> Result<IdentityMapping, SyncError>;

    /// Updates `updated_at` to now. No other field is mutable.
    fn touch(
        &mut self,
        entity_type: EntityType,
        relational_id: i64,
    ) -> Result<IdentityMapping, SyncError>;

    fn count_by_type(&self, entity_type: EntityType) -> Result<u64, SyncError>;

    /// The most recently touched mapping across all entity types.
    fn most_recently_updated(&self) -> Result<Option<IdentityMapping>, SyncError>;
}

// ---------------------------------------------------------------------------
// Shared index operations
// ---------------------------------------------------------------------------

fn find_by_rel(
    mappings: &[IdentityMapping],
    entity_type: EntityType,
    relational_id: i64,
) -> Option<&IdentityMapping> {
    mappings
        .iter()
        .find(|m| m.entity_type == entity_type && m.relational_id == relational_id)
}

fn find_by_ext<'a>(
    mappings: &'a [IdentityMapping],
    entity_type: EntityType,
    external_id: &ExternalId,
) -> Option<&'a IdentityMapping> {
    mappings
        .iter()
        .find(|m| m.entity_type == entity_type && &m.external_id == external_id)
}

fn create_in(
    mappings: &mut Vec<IdentityMapping>,
    entity_type: EntityType,
    relational_id: i64,
    external_id: ExternalId,
) -> Result<IdentityMapping, SyncError> {
    if find_by_rel(mappings, entity_type, relational_id).is_some()
        || find_by_ext(mappings, entity_type, &external_id).is_some()
    {
        return Err(SyncError::DuplicateMapping {
            entity_type,
            relational_id,
            external_id: external_id.0,
        });
    }
    let mapping = IdentityMapping {
        entity_type,
        relational_id,
        external_id,
        updated_at: Utc::now(),
    };
    mappings.push(mapping.clone());
    Ok(mapping)
}

fn touch_in(
    mappings: &mut [IdentityMapping],
    entity_type: EntityType,
    relational_id: i64,
) -> Result<IdentityMapping, SyncError> {
    let mapping = mappings
        .iter_mut()
        .find(|m| m.entity_type == entity_type && m.relational_id == relational_id)
        .ok_or(SyncError::MappingNotFound {
            entity_type,
            relational_id,
        })?;
    mapping.updated_at = Utc::now();
    Ok(mapping.clone())
}

fn most_recent(mappings: &[IdentityMapping]) -> Option<IdentityMapping> {
    mappings.iter().max_by_key(|m| m.updated_at).cloned()
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Mapping store held entirely in memory; the test double.
#[derive(Debug, Clone, Default)]
pub struct MemoryMappingStore {
    mappings: Vec<IdentityMapping>,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MappingStore for MemoryMappingStore {
    fn find_by_relational_id(
        &self,
        entity_type: EntityType,
        relational_id: i64,
    ) -> Result<Option<IdentityMapping>, SyncError> {
        Ok(find_by_rel(&self.mappings, entity_type, relational_id).cloned())
    }

    fn find_by_external_id(
        &self,
        entity_type: EntityType,
        external_id: &ExternalId,
    ) -> Result<Option<IdentityMapping>, SyncError> {
        Ok(find_by_ext(&self.mappings, entity_type, external_id).cloned())
    }

    fn create(
        &mut self,
        entity_type: EntityType,
        relational_id: i64,
        external_id: ExternalId,
    ) -> Result<IdentityMapping, SyncError> {
        create_in(&mut self.mappings, entity_type, relational_id, external_id)
    }

    fn touch(
        &mut self,
        entity_type: EntityType,
        relational_id: i64,
    ) -> Result<IdentityMapping, SyncError> {
        touch_in(&mut self.mappings, entity_type, relational_id)
    }

    fn count_by_type(&self, entity_type: EntityType) -> Result<u64, SyncError> {
        Ok(self
            .mappings
            .iter()
            .filter(|m| m.entity_type == entity_type)
            .count() as u64)
    }

    fn most_recently_updated(&self) -> Result<Option<IdentityMapping>, SyncError> {
        Ok(most_recent(&self.mappings))
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// On-disk mapping store payload.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct MappingFile {
    mappings: Vec<IdentityMapping>,
}

/// Mapping store persisted at `<data_dir>/mappings.json`.
#[derive(Debug)]
pub struct JsonMappingStore {
    path: PathBuf,
    mappings: Vec<IdentityMapping>,
}

impl JsonMappingStore {
    /// Conventional file name inside a data directory.
    pub fn path_at(data_dir: &Path) -> PathBuf {
        data_dir.join("mappings.json")
    }

    /// Opens the mapping file; a missing file starts an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                mappings: Vec::new(),
            });
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let file: MappingFile = serde_json::from_str(&contents)?;
        Ok(Self {
            path,
            mappings: file.mappings,
        })
    }

    /// Saves atomically: serialize → sibling `.tmp` → rename.
    fn save(&self) -> Result<(), SyncError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
        let file = MappingFile {
            mappings: self.mappings.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        let tmp = PathBuf::from(format!("{}.tmp", self.path.display()));
        std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| io_err(&self.path, e))?;
        Ok(())
    }
}

impl MappingStore for JsonMappingStore {
    fn find_by_relational_id(
        &self,
        entity_type: EntityType,
        relational_id: i64,
    ) -> Result<Option<IdentityMapping>, SyncError> {
        Ok(find_by_rel(&self.mappings, entity_type, relational_id).cloned())
    }

    fn find_by_external_id(
        &self,
        entity_type: EntityType,
        external_id: &ExternalId,
    ) -> Result<Option<IdentityMapping>, SyncError> {
        Ok(find_by_ext(&self.mappings, entity_type, external_id).cloned())
    }

    fn create(
        &mut self,
        entity_type: EntityType,
        relational_id: i64,
        external_id: ExternalId,
    ) -> Result<IdentityMapping, SyncError> {
        let mapping = create_in(&mut self.mappings, entity_type, relational_id, external_id)?;
        self.save()?;
        Ok(mapping)
    }

    fn touch(
        &mut self,
        entity_type: EntityType,
        relational_id: i64,
    ) -> Result<IdentityMapping, SyncError> {
        let mapping = touch_in(&mut self.mappings, entity_type, relational_id)?;
        self.save()?;
        Ok(mapping)
    }

    fn count_by_type(&self, entity_type: EntityType) -> Result<u64, SyncError> {
        Ok(self
            .mappings
            .iter()
            .filter(|m| m.entity_type == entity_type)
            .count() as u64)
    }

    fn most_recently_updated(&self) -> Result<Option<IdentityMapping>, SyncError> {
        Ok(most_recent(&self.mappings))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn create_then_find_both_directions() {
        let mut store = MemoryMappingStore::new();
        store
            .create(EntityType::User, 7, ExternalId::from("u_abc"))
            .unwrap();

        let by_rel = store
            .find_by_relational_id(EntityType::User, 7)
            .unwrap()
            .unwrap();
        assert_eq!(by_rel.external_id, ExternalId::from("u_abc"));

        let by_ext = store
            .find_by_external_id(EntityType::User, &ExternalId::from("u_abc"))
            .unwrap()
            .unwrap();
        assert_eq!(by_ext.relational_id, 7);
    }

    #[test]
    fn duplicate_relational_half_rejected() {
        let mut store = MemoryMappingStore::new();
        store
            .create(EntityType::User, 7, ExternalId::from("u_abc"))
            .unwrap();
        let err = store
            .create(EntityType::User, 7, ExternalId::from("u_other"))
            .unwrap_err();
        assert!(matches!(err, SyncError::DuplicateMapping { .. }));
    }

    #[test]
    fn duplicate_external_half_rejected() {
        let mut store = MemoryMappingStore::new();
        store
            .create(EntityType::User, 7, ExternalId::from("u_abc"))
            .unwrap();
        let err = store
            .create(EntityType::User, 8, ExternalId::from("u_abc"))
            .unwrap_err();
        assert!(matches!(err, SyncError::DuplicateMapping { .. }));
    }

    #[test]
    fn same_pair_allowed_across_entity_types() {
        let mut store = MemoryMappingStore::new();
        store
            .create(EntityType::User, 1, ExternalId::from("x_1"))
            .unwrap();
        store
            .create(EntityType::Report, 1, ExternalId::from("x_1"))
            .unwrap();
        assert_eq!(store.count_by_type(EntityType::User).unwrap(), 1);
        assert_eq!(store.count_by_type(EntityType::Report).unwrap(), 1);
    }

    #[test]
    fn touch_advances_updated_at_only() {
        let mut store = MemoryMappingStore::new();
        let created = store
            .create(EntityType::User, 7, ExternalId::from("u_abc"))
            .unwrap();

        let touched = store.touch(EntityType::User, 7).unwrap();
        assert!(touched.updated_at >= created.updated_at);
        assert_eq!(touched.relational_id, created.relational_id);
        assert_eq!(touched.external_id, created.external_id);
    }

    #[test]
    fn touch_missing_mapping_fails() {
        let mut store = MemoryMappingStore::new();
        let err = store.touch(EntityType::Report, 42).unwrap_err();
        assert!(matches!(err, SyncError::MappingNotFound { .. }));
    }

    #[test]
    fn most_recently_updated_spans_entity_types() {
        let mut store = MemoryMappingStore::new();
        store
            .create(EntityType::User, 1, ExternalId::from("u_1"))
            .unwrap();
        store
            .create(EntityType::Report, 1, ExternalId::from("s_1"))
            .unwrap();
        store.touch(EntityType::User, 1).unwrap();

        let latest = store.most_recently_updated().unwrap().unwrap();
        assert_eq!(latest.entity_type, EntityType::User);
    }

    #[test]
    fn empty_store_has_no_most_recent() {
        let store = MemoryMappingStore::new();
        assert!(store.most_recently_updated().unwrap().is_none());
    }

    #[test]
    fn json_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = JsonMappingStore::path_at(dir.path());

        {
            let mut store = JsonMappingStore::open(&path).unwrap();
            store
                .create(EntityType::User, 7, ExternalId::from("u_abc"))
                .unwrap();
        }

        let store = JsonMappingStore::open(&path).unwrap();
        let mapping = store
            .find_by_relational_id(EntityType::User, 7)
            .unwrap()
            .unwrap();
        assert_eq!(mapping.external_id, ExternalId::from("u_abc"));
        assert_eq!(store.count_by_type(EntityType::User).unwrap(), 1);
    }

    #[test]
    fn json_store_tmp_cleaned_up() {
        let dir = TempDir::new().unwrap();
        let path = JsonMappingStore::path_at(dir.path());
        let mut store = JsonMappingStore::open(&path).unwrap();
        store
            .create(EntityType::Report, 42, ExternalId::from("s_42"))
            .unwrap();
        let tmp = PathBuf::from(format!("{}.tmp", path.display()));
        assert!(!tmp.exists(), "tmp file should be removed after rename");
    }
}
