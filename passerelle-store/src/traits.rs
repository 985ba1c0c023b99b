//! Store adapter traits — the dependency-injection seam of the engine.

use passerelle_core::types::{
    AccountState, Document, ExternalId, ReportFields, ReportId, ReportRecord,
    ReportWithAssociations, UserFields, UserId, UserRecord,
};

use crate::error::StoreError;

/// The web-facing relational store (foreign-key-constrained).
///
/// Writes referencing a non-existent profile, user or status id fail with
/// [`StoreError::ForeignKey`]; the user email column is unique. List methods
/// return records in ascending id order.
pub trait RelationalStore {
    fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
    fn list_users(&self) -> Result<Vec<UserRecord>, StoreError>;
    fn create_user(&mut self, fields: &UserFields) -> Result<UserId, StoreError>;
    /// Overwrites exactly the fields in `fields`; the id never changes.
    fn update_user(&mut self, id: UserId, fields: &UserFields) -> Result<(), StoreError>;
    fn count_users(&self) -> Result<u64, StoreError>;

    /// Appends to the user's status history. History is append-only; the
    /// current state is always the most recent entry.
    fn append_user_status(&mut self, id: UserId, state: AccountState) -> Result<(), StoreError>;
    fn current_user_status(&self, id: UserId) -> Result<Option<AccountState>, StoreError>;

    fn find_report(&self, id: ReportId) -> Result<Option<ReportRecord>, StoreError>;
    fn list_reports(&self) -> Result<Vec<ReportRecord>, StoreError>;
    fn create_report(&mut self, fields: &ReportFields) -> Result<ReportId, StoreError>;
    fn update_report(&mut self, id: ReportId, fields: &ReportFields) -> Result<(), StoreError>;
    fn count_reports(&self) -> Result<u64, StoreError>;
    /// Association-aware read: the report joined with its point and the
    /// status lookup row (id + display label).
    fn report_associations(
        &self,
        id: ReportId,
    ) -> Result<Option<ReportWithAssociations>, StoreError>;
}

/// The mobile-facing document store (schema-less, addressed by opaque ids).
pub trait DocumentStore {
    /// Full collection scan, ascending id order.
    fn get_all(&self, collection: &str) -> Result<Vec<(ExternalId, Document)>, StoreError>;
    fn get(&self, collection: &str, id: &ExternalId) -> Result<Option<Document>, StoreError>;
    /// Creates a document and returns the store-assigned id.
    fn create(&mut self, collection: &str, fields: &Document) -> Result<ExternalId, StoreError>;
    /// Partial update: merges the top-level keys of `partial` into the
    /// document, leaving unnamed fields untouched.
    fn update(
        &mut self,
        collection: &str,
        id: &ExternalId,
        partial: &Document,
    ) -> Result<(), StoreError>;
}
