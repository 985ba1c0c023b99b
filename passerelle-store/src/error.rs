//! Error types for store adapters.

use std::path::PathBuf;

use thiserror::Error;

/// All errors a store adapter can surface to the engine.
///
/// The engine classifies these with [`StoreError::is_fatal`]: connection-level
/// failures abort the whole push/pull step, everything else is a per-record
/// error that only skips the record it occurred on.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store is unreachable or rejected the entire operation.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// A record addressed by id does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A write referenced an id that does not exist.
    #[error("foreign key violation: {field} = {value} does not exist")]
    ForeignKey { field: &'static str, value: String },

    /// A unique constraint was violated.
    #[error("duplicate {entity}: {key}")]
    Duplicate { entity: &'static str, key: String },

    /// Filesystem failure in a file-backed store, with annotated path.
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store file (de)serialization failure.
    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Connection-level failures that make the whole batch call fail, as
    /// opposed to per-record errors that only skip one record.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable { .. } | StoreError::Io { .. } | StoreError::Json(_)
        )
    }
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_is_fatal() {
        let err = StoreError::Unavailable {
            reason: "connection refused".to_owned(),
        };
        assert!(err.is_fatal());
    }

    #[test]
    fn record_level_errors_are_not_fatal() {
        let fk = StoreError::ForeignKey {
            field: "status_id",
            value: "99".to_owned(),
        };
        let dup = StoreError::Duplicate {
            entity: "user",
            key: "a@x.com".to_owned(),
        };
        let missing = StoreError::NotFound {
            entity: "report",
            id: "42".to_owned(),
        };
        assert!(!fk.is_fatal());
        assert!(!dup.is_fatal());
        assert!(!missing.is_fatal());
    }
}
