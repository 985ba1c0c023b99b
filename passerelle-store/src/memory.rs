//! In-memory store adapters — the engine's test doubles.
//!
//! Both stores carry an `offline` toggle so tests can simulate a
//! connection-level failure (`StoreError::Unavailable`) without a real
//! backend.

use passerelle_core::types::{
    AccountState, Document, ExternalId, ReportFields, ReportId, ReportRecord,
    ReportWithAssociations, UserFields, UserId, UserRecord,
};

use crate::error::StoreError;
use crate::state::{DocumentState, RelationalState};
use crate::traits::{DocumentStore, RelationalStore};

// ---------------------------------------------------------------------------
// Relational
// ---------------------------------------------------------------------------

/// `BTreeMap`-backed relational store with seeded profile/status tables.
#[derive(Debug, Clone)]
pub struct MemoryRelationalStore {
    state: RelationalState,
    offline: bool,
}

impl MemoryRelationalStore {
    pub fn new() -> Self {
        Self {
            state: RelationalState::seeded(),
            offline: false,
        }
    }

    /// Makes every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    fn guard(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable {
                reason: "relational store offline".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for MemoryRelationalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationalStore for MemoryRelationalStore {
    fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        self.guard()?;
        Ok(self.state.users.get(&id.0).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.guard()?;
        Ok(self.state.users.values().find(|u| u.email == email).cloned())
    }

    fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        self.guard()?;
        Ok(self.state.users.values().cloned().collect())
    }

    fn create_user(&mut self, fields: &UserFields) -> Result<UserId, StoreError> {
        self.guard()?;
        self.state.create_user(fields)
    }

    fn update_user(&mut self, id: UserId, fields: &UserFields) -> Result<(), StoreError> {
        self.guard()?;
        self.state.update_user(id, fields)
    }

    fn count_users(&self) -> Result<u64, StoreError> {
        self.guard()?;
        Ok(self.state.users.len() as u64)
    }

    fn append_user_status(&mut self, id: UserId, state: AccountState) -> Result<(), StoreError> {
        self.guard()?;
        self.state.append_user_status(id, state)
    }

    fn current_user_status(&self, id: UserId) -> Result<Option<AccountState>, StoreError> {
        self.guard()?;
        self.state.current_user_status(id)
    }

    fn find_report(&self, id: ReportId) -> Result<Option<ReportRecord>, StoreError> {
        self.guard()?;
        Ok(self.state.reports.get(&id.0).cloned())
    }

    fn list_reports(&self) -> Result<Vec<ReportRecord>, StoreError> {
        self.guard()?;
        Ok(self.state.reports.values().cloned().collect())
    }

    fn create_report(&mut self, fields: &ReportFields) -> Result<ReportId, StoreError> {
        self.guard()?;
        self.state.create_report(fields)
    }

    fn update_report(&mut self, id: ReportId, fields: &ReportFields) -> Result<(), StoreError> {
        self.guard()?;
        self.state.update_report(id, fields)
    }

    fn count_reports(&self) -> Result<u64, StoreError> {
        self.guard()?;
        Ok(self.state.reports.len() as u64)
    }

    fn report_associations(
        &self,
        id: ReportId,
    ) -> Result<Option<ReportWithAssociations>, StoreError> {
        self.guard()?;
        self.state.report_associations(id)
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// `BTreeMap`-backed document store.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    state: DocumentState,
    offline: bool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Seeds a document under a caller-chosen id.
    pub fn insert(&mut self, collection: &str, id: ExternalId, fields: Document) {
        self.state.insert(collection, id, fields);
    }

    fn guard(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable {
                reason: "document store offline".to_owned(),
            });
        }
        Ok(())
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get_all(&self, collection: &str) -> Result<Vec<(ExternalId, Document)>, StoreError> {
        self.guard()?;
        Ok(self.state.get_all(collection))
    }

    fn get(&self, collection: &str, id: &ExternalId) -> Result<Option<Document>, StoreError> {
        self.guard()?;
        Ok(self.state.get(collection, id))
    }

    fn create(&mut self, collection: &str, fields: &Document) -> Result<ExternalId, StoreError> {
        self.guard()?;
        Ok(self.state.create(collection, fields))
    }

    fn update(
        &mut self,
        collection: &str,
        id: &ExternalId,
        partial: &Document,
    ) -> Result<(), StoreError> {
        self.guard()?;
        self.state.update(collection, id, partial)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user_fields(email: &str) -> UserFields {
        UserFields {
            email: email.to_owned(),
            password_hash: Some("h1".to_owned()),
            birth_date: None,
            profile_id: 1,
        }
    }

    #[test]
    fn create_then_find_user() {
        let mut store = MemoryRelationalStore::new();
        let id = store.create_user(&user_fields("a@x.com")).unwrap();
        let found = store.find_user(id).unwrap().unwrap();
        assert_eq!(found.email, "a@x.com");
        assert_eq!(store.count_users().unwrap(), 1);
    }

    #[test]
    fn duplicate_email_rejected() {
        let mut store = MemoryRelationalStore::new();
        store.create_user(&user_fields("a@x.com")).unwrap();
        let err = store.create_user(&user_fields("a@x.com")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[test]
    fn unknown_profile_rejected() {
        let mut store = MemoryRelationalStore::new();
        let mut fields = user_fields("a@x.com");
        fields.profile_id = 99;
        let err = store.create_user(&fields).unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey { field: "profile_id", .. }));
    }

    #[test]
    fn report_with_unknown_status_rejected() {
        let mut store = MemoryRelationalStore::new();
        let err = store
            .create_report(&ReportFields {
                description: "x".to_owned(),
                user_id: None,
                status_id: Some(99),
                point: None,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey { field: "status_id", .. }));
    }

    #[test]
    fn list_users_is_id_ordered() {
        let mut store = MemoryRelationalStore::new();
        store.create_user(&user_fields("b@x.com")).unwrap();
        store.create_user(&user_fields("a@x.com")).unwrap();
        let ids: Vec<i64> = store.list_users().unwrap().iter().map(|u| u.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn offline_store_fails_with_unavailable() {
        let mut store = MemoryRelationalStore::new();
        store.set_offline(true);
        let err = store.list_users().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn document_scan_is_id_ordered() {
        let mut store = MemoryDocumentStore::new();
        store.insert("users", ExternalId::from("u_b"), json!({"email": "b@x.com"}));
        store.insert("users", ExternalId::from("u_a"), json!({"email": "a@x.com"}));
        let ids: Vec<String> = store
            .get_all("users")
            .unwrap()
            .into_iter()
            .map(|(id, _)| id.0)
            .collect();
        assert_eq!(ids, vec!["u_a", "u_b"]);
    }

    #[test]
    fn document_create_assigns_fresh_ids() {
        let mut store = MemoryDocumentStore::new();
        let a = store.create("users", &json!({"email": "a@x.com"})).unwrap();
        let b = store.create("users", &json!({"email": "b@x.com"})).unwrap();
        assert_ne!(a, b);
        assert!(store.get("users", &a).unwrap().is_some());
    }

    #[test]
    fn missing_collection_scans_empty() {
        let store = MemoryDocumentStore::new();
        assert!(store.get_all("signalements").unwrap().is_empty());
    }
}
