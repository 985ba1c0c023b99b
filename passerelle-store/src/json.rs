//! JSON-file-backed store adapters used by the `passerelle` CLI.
//!
//! Each store persists its whole state as one pretty-printed JSON document.
//! Writes use the atomic `.tmp` + rename pattern so a crash mid-save never
//! leaves a half-written store file. A missing file opens as an empty store.

use std::path::{Path, PathBuf};

use passerelle_core::types::{
    AccountState, Document, ExternalId, ReportFields, ReportId, ReportRecord,
    ReportWithAssociations, UserFields, UserId, UserRecord,
};

use crate::error::{io_err, StoreError};
use crate::state::{DocumentState, RelationalState};
use crate::traits::{DocumentStore, RelationalStore};

fn load_state<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    Ok(Some(serde_json::from_str(&contents)?))
}

fn save_state<T: serde::Serialize>(path: &Path, state: &T) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let json = serde_json::to_string_pretty(state)?;
    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Relational
// ---------------------------------------------------------------------------

/// Relational store persisted at `<data_dir>/relational.json`.
#[derive(Debug)]
pub struct JsonRelationalStore {
    path: PathBuf,
    state: RelationalState,
}

impl JsonRelationalStore {
    /// Conventional file name inside a data directory.
    pub fn path_at(data_dir: &Path) -> PathBuf {
        data_dir.join("relational.json")
    }

    /// Opens the store file, starting from the seeded lookup tables when the
    /// file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = load_state(&path)?.unwrap_or_else(RelationalState::seeded);
        Ok(Self { path, state })
    }

    fn save(&self) -> Result<(), StoreError> {
        save_state(&self.path, &self.state)
    }
}

impl RelationalStore for JsonRelationalStore {
    fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.state.users.get(&id.0).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.state.users.values().find(|u| u.email == email).cloned())
    }

    fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.state.users.values().cloned().collect())
    }

    fn create_user(&mut self, fields: &UserFields) -> Result<UserId, StoreError> {
        let id = self.state.create_user(fields)?;
        self.save()?;
        Ok(id)
    }

    fn update_user(&mut self, id: UserId, fields: &UserFields) -> Result<(), StoreError> {
        self.state.update_user(id, fields)?;
        self.save()
    }

    fn count_users(&self) -> Result<u64, StoreError> {
        Ok(self.state.users.len() as u64)
    }

    fn append_user_status(&mut self, id: UserId, state: AccountState) -> Result<(), StoreError> {
        self.state.append_user_status(id, state)?;
        self.save()
    }

    fn current_user_status(&self, id: UserId) -> Result<Option<AccountState>, StoreError> {
        self.state.current_user_status(id)
    }

    fn find_report(&self, id: ReportId) -> Result<Option<ReportRecord>, StoreError> {
        Ok(self.state.reports.get(&id.0).cloned())
    }

    fn list_reports(&self) -> Result<Vec<ReportRecord>, StoreError> {
        Ok(self.state.reports.values().cloned().collect())
    }

    fn create_report(&mut self, fields: &ReportFields) -> Result<ReportId, StoreError> {
        let id = self.state.create_report(fields)?;
        self.save()?;
        Ok(id)
    }

    fn update_report(&mut self, id: ReportId, fields: &ReportFields) -> Result<(), StoreError> {
        self.state.update_report(id, fields)?;
        self.save()
    }

    fn count_reports(&self) -> Result<u64, StoreError> {
        Ok(self.state.reports.len() as u64)
    }

    fn report_associations(
        &self,
        id: ReportId,
    ) -> Result<Option<ReportWithAssociations>, StoreError> {
        self.state.report_associations(id)
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Document store persisted at `<data_dir>/documents.json`.
#[derive(Debug)]
pub struct JsonDocumentStore {
    path: PathBuf,
    state: DocumentState,
}

impl JsonDocumentStore {
    /// Conventional file name inside a data directory.
    pub fn path_at(data_dir: &Path) -> PathBuf {
        data_dir.join("documents.json")
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = load_state(&path)?.unwrap_or_default();
        Ok(Self { path, state })
    }

    /// Seeds a document under a caller-chosen id and persists immediately.
    pub fn insert(
        &mut self,
        collection: &str,
        id: ExternalId,
        fields: Document,
    ) -> Result<(), StoreError> {
        self.state.insert(collection, id, fields);
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        save_state(&self.path, &self.state)
    }
}

impl DocumentStore for JsonDocumentStore {
    fn get_all(&self, collection: &str) -> Result<Vec<(ExternalId, Document)>, StoreError> {
        Ok(self.state.get_all(collection))
    }

    fn get(&self, collection: &str, id: &ExternalId) -> Result<Option<Document>, StoreError> {
        Ok(self.state.get(collection, id))
    }

    fn create(&mut self, collection: &str, fields: &Document) -> Result<ExternalId, StoreError> {
        let id = self.state.create(collection, fields);
        self.save()?;
        Ok(id)
    }

    fn update(
        &mut self,
        collection: &str,
        id: &ExternalId,
        partial: &Document,
    ) -> Result<(), StoreError> {
        self.state.update(collection, id, partial)?;
        self.save()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
