//! The reconciliation engine.
//!
//! ## Upsert algorithm, per record
//!
//! 1. Translate the source record into the counterpart shape.
//! 2. Look up the identity mapping by the source-side id.
//! 3. Mapping found → update the existing counterpart (orphans are skipped
//!    with an error, never silently recreated).
//! 4. No mapping → insert a counterpart and create the mapping.
//! 5. Touch the mapping's `updated_at`.
//!
//! Records are processed sequentially, one at a time, in the order the
//! source store scans them; the find-then-create on the mapping is not safe
//! under concurrent execution for the same entity, and `&mut self` keeps a
//! single engine instance single-flight by construction.
//!
//! A per-record failure is appended to the step's error list and the batch
//! continues; only a connection-level store failure aborts the step.

use chrono::Utc;

use passerelle_core::types::{
    AccountState, Document, EntityType, ExternalId, ReportId, UserId, UserRecord,
};
use passerelle_store::{DocumentStore, RelationalStore, StoreError};
use passerelle_translate as translate;

use crate::error::SyncError;
use crate::identity_map::MappingStore;
use crate::report::{
    EntityRunReport, EntityStatus, RecordError, StatusReport, StepOutcome, SyncCounts,
    SyncRunReport,
};

/// What the upsert did with one record.
enum Applied {
    Inserted,
    Updated,
}

/// Reconciliation engine over three injected stores.
///
/// Construct one per run (or keep it around — it holds no state beyond the
/// stores themselves).
pub struct SyncEngine<R, D, M> {
    relational: R,
    documents: D,
    mappings: M,
}

impl<R, D, M> SyncEngine<R, D, M> {
    pub fn new(relational: R, documents: D, mappings: M) -> Self {
        Self {
            relational,
            documents,
            mappings,
        }
    }

    pub fn relational(&self) -> &R {
        &self.relational
    }

    pub fn relational_mut(&mut self) -> &mut R {
        &mut self.relational
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut D {
        &mut self.documents
    }

    pub fn mappings(&self) -> &M {
        &self.mappings
    }

    pub fn mappings_mut(&mut self) -> &mut M {
        &mut self.mappings
    }

    pub fn into_parts(self) -> (R, D, M) {
        (self.relational, self.documents, self.mappings)
    }
}

impl<R, D, M> SyncEngine<R, D, M>
where
    R: RelationalStore,
    D: DocumentStore,
    M: MappingStore,
{
    // -----------------------------------------------------------------------
    // Push: document store → relational store
    // -----------------------------------------------------------------------

    /// Reconciles every document of the entity's collection into the
    /// relational store.
    pub fn push(&mut self, entity_type: EntityType) -> Result<SyncCounts, SyncError> {
        let docs = self.documents.get_all(entity_type.collection())?;
        let mut counts = SyncCounts::default();

        for (external_id, doc) in docs {
            counts.total += 1;
            let applied = match entity_type {
                EntityType::User => self.push_user(&external_id, &doc),
                EntityType::Report => self.push_report(&external_id, &doc),
            };
            match applied {
                Ok(Applied::Inserted) => counts.inserted += 1,
                Ok(Applied::Updated) => counts.updated += 1,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("push {entity_type}: {external_id} failed: {e}");
                    counts.errors.push(RecordError::new(external_id.0, &e));
                }
            }
        }

        tracing::info!(
            "push {entity_type}: {} inserted, {} updated, {} errors of {} seen",
            counts.inserted,
            counts.updated,
            counts.errors.len(),
            counts.total
        );
        Ok(counts)
    }

    fn push_user(&mut self, external_id: &ExternalId, doc: &Document) -> Result<Applied, SyncError> {
        let fields = translate::user_to_relational(doc);

        match self
            .mappings
            .find_by_external_id(EntityType::User, external_id)?
        {
            Some(mapping) => {
                let id = UserId(mapping.relational_id);
                if self.relational.find_user(id)?.is_none() {
                    return Err(SyncError::OrphanMapping {
                        entity_type: EntityType::User,
                        relational_id: mapping.relational_id,
                    });
                }
                self.relational.update_user(id, &fields)?;
                self.mappings.touch(EntityType::User, id.0)?;
                Ok(Applied::Updated)
            }
            None => {
                let id = self.relational.create_user(&fields)?;
                // New accounts must be visible to status queries right away.
                self.relational.append_user_status(id, AccountState::Active)?;
                self.mappings
                    .create(EntityType::User, id.0, external_id.clone())?;
                self.mappings.touch(EntityType::User, id.0)?;
                Ok(Applied::Inserted)
            }
        }
    }

    fn push_report(
        &mut self,
        external_id: &ExternalId,
        doc: &Document,
    ) -> Result<Applied, SyncError> {
        let reporter = self.resolve_reporter(doc)?;
        let fields = translate::report_to_relational(doc, reporter);

        match self
            .mappings
            .find_by_external_id(EntityType::Report, external_id)?
        {
            Some(mapping) => {
                let id = ReportId(mapping.relational_id);
                if self.relational.find_report(id)?.is_none() {
                    return Err(SyncError::OrphanMapping {
                        entity_type: EntityType::Report,
                        relational_id: mapping.relational_id,
                    });
                }
                self.relational.update_report(id, &fields)?;
                self.mappings.touch(EntityType::Report, id.0)?;
                Ok(Applied::Updated)
            }
            None => {
                let id = self.relational.create_report(&fields)?;
                self.mappings
                    .create(EntityType::Report, id.0, external_id.clone())?;
                self.mappings.touch(EntityType::Report, id.0)?;
                Ok(Applied::Inserted)
            }
        }
    }

    /// Resolves a document's `utilisateur_firebase_id` to a relational user
    /// id via the identity map. Absent or not-yet-mapped → `None` (the
    /// reporting user column is nullable).
    fn resolve_reporter(&self, doc: &Document) -> Result<Option<UserId>, SyncError> {
        let Some(raw) = doc.get("utilisateur_firebase_id").and_then(|v| v.as_str()) else {
            return Ok(None);
        };
        let external = ExternalId::from(raw);
        Ok(self
            .mappings
            .find_by_external_id(EntityType::User, &external)?
            .map(|m| UserId(m.relational_id)))
    }

    // -----------------------------------------------------------------------
    // Pull: relational store → document store
    // -----------------------------------------------------------------------

    /// Reconciles every relational record of the type into the document
    /// store.
    pub fn pull(&mut self, entity_type: EntityType) -> Result<SyncCounts, SyncError> {
        match entity_type {
            EntityType::User => self.pull_users(),
            EntityType::Report => self.pull_reports(),
        }
    }

    fn pull_users(&mut self) -> Result<SyncCounts, SyncError> {
        let records = self.relational.list_users()?;
        let mut counts = SyncCounts::default();

        for record in records {
            counts.total += 1;
            match self.pull_user(&record) {
                Ok(Applied::Inserted) => counts.inserted += 1,
                Ok(Applied::Updated) => counts.updated += 1,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("pull user: record {} failed: {e}", record.id);
                    counts.errors.push(RecordError::new(record.id.to_string(), &e));
                }
            }
        }

        tracing::info!(
            "pull user: {} inserted, {} updated, {} errors of {} seen",
            counts.inserted,
            counts.updated,
            counts.errors.len(),
            counts.total
        );
        Ok(counts)
    }

    fn pull_user(&mut self, record: &UserRecord) -> Result<Applied, SyncError> {
        let doc = translate::user_to_document(record, Utc::now());
        self.apply_pull(EntityType::User, record.id.0, &doc)
    }

    fn pull_reports(&mut self) -> Result<SyncCounts, SyncError> {
        let records = self.relational.list_reports()?;
        let mut counts = SyncCounts::default();

        for record in records {
            counts.total += 1;
            match self.pull_report(record.id) {
                Ok(Applied::Inserted) => counts.inserted += 1,
                Ok(Applied::Updated) => counts.updated += 1,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("pull report: record {} failed: {e}", record.id);
                    counts.errors.push(RecordError::new(record.id.to_string(), &e));
                }
            }
        }

        tracing::info!(
            "pull report: {} inserted, {} updated, {} errors of {} seen",
            counts.inserted,
            counts.updated,
            counts.errors.len(),
            counts.total
        );
        Ok(counts)
    }

    fn pull_report(&mut self, id: ReportId) -> Result<Applied, SyncError> {
        let assoc = self.relational.report_associations(id)?.ok_or_else(|| {
            SyncError::Store(StoreError::NotFound {
                entity: "report",
                id: id.to_string(),
            })
        })?;

        let reporter = match assoc.report.user_id {
            Some(user_id) => self
                .mappings
                .find_by_relational_id(EntityType::User, user_id.0)?
                .map(|m| m.external_id),
            None => None,
        };

        let doc = translate::report_to_document(&assoc, reporter.as_ref(), Utc::now());
        self.apply_pull(EntityType::Report, id.0, &doc)
    }

    /// Shared pull tail: update the mapped document, or create one and
    /// record the store-assigned id in a fresh mapping.
    fn apply_pull(
        &mut self,
        entity_type: EntityType,
        relational_id: i64,
        doc: &Document,
    ) -> Result<Applied, SyncError> {
        let collection = entity_type.collection();
        match self
            .mappings
            .find_by_relational_id(entity_type, relational_id)?
        {
            Some(mapping) => {
                self.documents.update(collection, &mapping.external_id, doc)?;
                self.mappings.touch(entity_type, relational_id)?;
                Ok(Applied::Updated)
            }
            None => {
                let external_id = self.documents.create(collection, doc)?;
                self.mappings.create(entity_type, relational_id, external_id)?;
                self.mappings.touch(entity_type, relational_id)?;
                Ok(Applied::Inserted)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Orchestration
    // -----------------------------------------------------------------------

    /// Push then pull for one entity type. Each step's fatal error is
    /// captured in its outcome; a failed push never prevents the pull.
    pub fn sync_entity(&mut self, entity_type: EntityType) -> EntityRunReport {
        EntityRunReport {
            push: self.step(|engine| engine.push(entity_type)),
            pull: self.step(|engine| engine.pull(entity_type)),
        }
    }

    /// Full run in the fixed order: push(user), pull(user), push(report),
    /// pull(report). Always returns the complete report; callers decide what
    /// a partial failure means via [`SyncRunReport::all_failed`].
    pub fn sync_all(&mut self) -> SyncRunReport {
        SyncRunReport {
            users: self.sync_entity(EntityType::User),
            reports: self.sync_entity(EntityType::Report),
        }
    }

    fn step<F>(&mut self, f: F) -> StepOutcome
    where
        F: FnOnce(&mut Self) -> Result<SyncCounts, SyncError>,
    {
        match f(self) {
            Ok(counts) => StepOutcome::Completed { counts },
            Err(e) => {
                tracing::warn!("sync step failed: {e}");
                StepOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    /// Mapping coverage per entity type plus the most recent mapping touch.
    pub fn status(&self) -> Result<StatusReport, SyncError> {
        let users = EntityStatus::new(
            self.relational.count_users()?,
            self.mappings.count_by_type(EntityType::User)?,
        );
        let reports = EntityStatus::new(
            self.relational.count_reports()?,
            self.mappings.count_by_type(EntityType::Report)?,
        );
        let last_sync_at = self.mappings.most_recently_updated()?.map(|m| m.updated_at);
        Ok(StatusReport {
            users,
            reports,
            last_sync_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
