//! Error types for passerelle-sync.

use std::path::PathBuf;

use thiserror::Error;

use passerelle_core::types::EntityType;
use passerelle_store::StoreError;

/// All errors that can arise from reconciliation operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Either half of a mapping pair already exists for this entity type.
    #[error(
        "duplicate mapping for {entity_type}: relational id {relational_id} / external id {external_id}"
    )]
    DuplicateMapping {
        entity_type: EntityType,
        relational_id: i64,
        external_id: String,
    },

    /// A touch addressed a mapping that does not exist.
    #[error("no mapping for {entity_type} relational id {relational_id}")]
    MappingNotFound {
        entity_type: EntityType,
        relational_id: i64,
    },

    /// A mapping references a relational record deleted out-of-band.
    #[error(
        "orphan mapping: {entity_type} relational id {relational_id} no longer resolves to a record"
    )]
    OrphanMapping {
        entity_type: EntityType,
        relational_id: i64,
    },

    /// An error from a store adapter.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Filesystem failure in the file-backed mapping store.
    #[error("mapping store I/O error at {path}: {source}")]
    MapIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mapping store file (de)serialization failure.
    #[error("mapping store JSON error: {0}")]
    MapJson(#[from] serde_json::Error),
}

impl SyncError {
    /// Whether this error aborts the whole push/pull step.
    ///
    /// Connection-level store failures and mapping-store persistence
    /// failures are fatal; everything else is captured per record and the
    /// batch continues.
    pub fn is_fatal(&self) -> bool {
        match self {
            SyncError::Store(e) => e.is_fatal(),
            SyncError::MapIo { .. } | SyncError::MapJson(_) => true,
            SyncError::DuplicateMapping { .. }
            | SyncError::MappingNotFound { .. }
            | SyncError::OrphanMapping { .. } => false,
        }
    }
}

/// Convenience constructor for [`SyncError::MapIo`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::MapIo {
        path: path.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orphan_mapping_is_per_record() {
        let err = SyncError::OrphanMapping {
            entity_type: EntityType::User,
            relational_id: 7,
        };
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("orphan mapping"));
    }

    #[test]
    fn unavailable_store_is_fatal() {
        let err = SyncError::Store(StoreError::Unavailable {
            reason: "down".to_owned(),
        });
        assert!(err.is_fatal());
    }

    #[test]
    fn foreign_key_store_error_is_per_record() {
        let err = SyncError::Store(StoreError::ForeignKey {
            field: "status_id",
            value: "99".to_owned(),
        });
        assert!(!err.is_fatal());
    }
}
