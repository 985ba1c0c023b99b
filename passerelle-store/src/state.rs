//! Shared store state behind the memory and JSON-file adapters.
//!
//! All operations live here so that `MemoryRelationalStore` and
//! `JsonRelationalStore` (and the document-store pair) stay thin wrappers:
//! the memory variant adds an offline toggle, the file variant adds
//! load/save.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use passerelle_core::types::{
    AccountState, Document, ExternalId, Point, ReportFields, ReportId, ReportRecord,
    ReportWithAssociations, StatusRef, UserFields, UserId, UserRecord,
};

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Relational state
// ---------------------------------------------------------------------------

/// One entry in a user's append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StatusHistoryEntry {
    pub user_id: UserId,
    pub state: AccountState,
    pub recorded_at: DateTime<Utc>,
}

/// Whole-store relational state. `BTreeMap` keys give ascending-id scans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RelationalState {
    pub users: BTreeMap<i64, UserRecord>,
    pub user_status_history: Vec<StatusHistoryEntry>,
    pub reports: BTreeMap<i64, ReportRecord>,
    pub points: BTreeMap<i64, Point>,
    /// Profile lookup table (id → name). Seeded, never written by sync.
    pub profiles: BTreeMap<i64, String>,
    /// Status lookup table (id → display label). Seeded, never written by sync.
    pub statuses: BTreeMap<i64, String>,
    pub next_user_id: i64,
    pub next_report_id: i64,
    pub next_point_id: i64,
}

impl RelationalState {
    /// Empty state with the lookup tables the signalement workflow expects.
    pub fn seeded() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(1, "utilisateur".to_owned());
        profiles.insert(2, "administrateur".to_owned());

        let mut statuses = BTreeMap::new();
        statuses.insert(1, "nouveau".to_owned());
        statuses.insert(2, "en cours".to_owned());
        statuses.insert(3, "traité".to_owned());

        Self {
            users: BTreeMap::new(),
            user_status_history: Vec::new(),
            reports: BTreeMap::new(),
            points: BTreeMap::new(),
            profiles,
            statuses,
            next_user_id: 1,
            next_report_id: 1,
            next_point_id: 1,
        }
    }

    fn check_profile(&self, profile_id: i64) -> Result<(), StoreError> {
        if self.profiles.contains_key(&profile_id) {
            return Ok(());
        }
        Err(StoreError::ForeignKey {
            field: "profile_id",
            value: profile_id.to_string(),
        })
    }

    fn check_status(&self, status_id: i64) -> Result<(), StoreError> {
        if self.statuses.contains_key(&status_id) {
            return Ok(());
        }
        Err(StoreError::ForeignKey {
            field: "status_id",
            value: status_id.to_string(),
        })
    }

    fn check_user(&self, user_id: UserId) -> Result<(), StoreError> {
        if self.users.contains_key(&user_id.0) {
            return Ok(());
        }
        Err(StoreError::ForeignKey {
            field: "user_id",
            value: user_id.to_string(),
        })
    }

    fn check_email_unique(&self, email: &str, exclude: Option<UserId>) -> Result<(), StoreError> {
        let taken = self
            .users
            .values()
            .any(|u| u.email == email && Some(u.id) != exclude);
        if taken {
            return Err(StoreError::Duplicate {
                entity: "user",
                key: email.to_owned(),
            });
        }
        Ok(())
    }

    pub fn create_user(&mut self, fields: &UserFields) -> Result<UserId, StoreError> {
        self.check_profile(fields.profile_id)?;
        self.check_email_unique(&fields.email, None)?;

        let id = UserId(self.next_user_id);
        self.next_user_id += 1;
        self.users.insert(
            id.0,
            UserRecord {
                id,
                email: fields.email.clone(),
                password_hash: fields.password_hash.clone(),
                birth_date: fields.birth_date,
                profile_id: fields.profile_id,
            },
        );
        Ok(id)
    }

    pub fn update_user(&mut self, id: UserId, fields: &UserFields) -> Result<(), StoreError> {
        self.check_profile(fields.profile_id)?;
        self.check_email_unique(&fields.email, Some(id))?;

        let record = self.users.get_mut(&id.0).ok_or(StoreError::NotFound {
            entity: "user",
            id: id.to_string(),
        })?;
        record.email = fields.email.clone();
        record.password_hash = fields.password_hash.clone();
        record.birth_date = fields.birth_date;
        record.profile_id = fields.profile_id;
        Ok(())
    }

    pub fn append_user_status(
        &mut self,
        id: UserId,
        state: AccountState,
    ) -> Result<(), StoreError> {
        self.check_user(id)?;
        self.user_status_history.push(StatusHistoryEntry {
            user_id: id,
            state,
            recorded_at: Utc::now(),
        });
        Ok(())
    }

    pub fn current_user_status(&self, id: UserId) -> Result<Option<AccountState>, StoreError> {
        Ok(self
            .user_status_history
            .iter()
            .rev()
            .find(|e| e.user_id == id)
            .map(|e| e.state))
    }

    pub fn create_report(&mut self, fields: &ReportFields) -> Result<ReportId, StoreError> {
        if let Some(user_id) = fields.user_id {
            self.check_user(user_id)?;
        }
        if let Some(status_id) = fields.status_id {
            self.check_status(status_id)?;
        }

        let point_id = fields.point.as_ref().map(|p| {
            let id = self.next_point_id;
            self.next_point_id += 1;
            self.points.insert(
                id,
                Point {
                    id,
                    latitude: p.latitude,
                    longitude: p.longitude,
                    city_id: p.city_id,
                },
            );
            id
        });

        let id = ReportId(self.next_report_id);
        self.next_report_id += 1;
        self.reports.insert(
            id.0,
            ReportRecord {
                id,
                description: fields.description.clone(),
                user_id: fields.user_id,
                point_id,
                status_id: fields.status_id,
            },
        );
        Ok(id)
    }

    pub fn update_report(&mut self, id: ReportId, fields: &ReportFields) -> Result<(), StoreError> {
        if let Some(user_id) = fields.user_id {
            self.check_user(user_id)?;
        }
        if let Some(status_id) = fields.status_id {
            self.check_status(status_id)?;
        }
        if !self.reports.contains_key(&id.0) {
            return Err(StoreError::NotFound {
                entity: "report",
                id: id.to_string(),
            });
        }

        // Translation carried coordinates: update the existing point in
        // place, or create one if the report never had any.
        let mut point_id = self.reports[&id.0].point_id;
        if let Some(p) = &fields.point {
            match point_id.and_then(|pid| self.points.get_mut(&pid)) {
                Some(point) => {
                    point.latitude = p.latitude;
                    point.longitude = p.longitude;
                    point.city_id = p.city_id;
                }
                None => {
                    let pid = self.next_point_id;
                    self.next_point_id += 1;
                    self.points.insert(
                        pid,
                        Point {
                            id: pid,
                            latitude: p.latitude,
                            longitude: p.longitude,
                            city_id: p.city_id,
                        },
                    );
                    point_id = Some(pid);
                }
            }
        }

        let record = self.reports.get_mut(&id.0).ok_or(StoreError::NotFound {
            entity: "report",
            id: id.to_string(),
        })?;
        record.description = fields.description.clone();
        record.user_id = fields.user_id;
        record.status_id = fields.status_id;
        record.point_id = point_id;
        Ok(())
    }

    pub fn report_associations(
        &self,
        id: ReportId,
    ) -> Result<Option<ReportWithAssociations>, StoreError> {
        let Some(report) = self.reports.get(&id.0) else {
            return Ok(None);
        };
        let point = report.point_id.and_then(|pid| self.points.get(&pid)).cloned();
        let status = report.status_id.and_then(|sid| {
            self.statuses.get(&sid).map(|label| StatusRef {
                id: sid,
                label: label.clone(),
            })
        });
        Ok(Some(ReportWithAssociations {
            report: report.clone(),
            point,
            status,
        }))
    }
}

// ---------------------------------------------------------------------------
// Document state
// ---------------------------------------------------------------------------

/// Whole-store document state: collections of id-addressed documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct DocumentState {
    pub collections: BTreeMap<String, BTreeMap<String, Document>>,
    pub next_id: u64,
}

impl DocumentState {
    pub fn get_all(&self, collection: &str) -> Vec<(ExternalId, Document)> {
        self.collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| (ExternalId(id.clone()), doc.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get(&self, collection: &str, id: &ExternalId) -> Option<Document> {
        self.collections
            .get(collection)
            .and_then(|docs| docs.get(&id.0))
            .cloned()
    }

    pub fn create(&mut self, collection: &str, fields: &Document) -> ExternalId {
        self.next_id += 1;
        let id = format!("doc_{:06}", self.next_id);
        self.collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.clone(), fields.clone());
        ExternalId(id)
    }

    /// Seeds a document under a caller-chosen id (fixtures and tests).
    pub fn insert(&mut self, collection: &str, id: ExternalId, fields: Document) {
        self.collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.0, fields);
    }

    pub fn update(
        &mut self,
        collection: &str,
        id: &ExternalId,
        partial: &Document,
    ) -> Result<(), StoreError> {
        let doc = self
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(&id.0))
            .ok_or(StoreError::NotFound {
                entity: "document",
                id: id.to_string(),
            })?;

        // Merge named top-level fields; anything else in the document stays.
        match (doc.as_object_mut(), partial.as_object()) {
            (Some(existing), Some(named)) => {
                for (key, value) in named {
                    existing.insert(key.clone(), value.clone());
                }
            }
            _ => *doc = partial.clone(),
        }
        Ok(())
    }
}
