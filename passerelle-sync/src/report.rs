//! Result structures returned by engine operations.
//!
//! Everything here is serializable as-is; the CLI (and any other outer
//! surface) emits these structures without reshaping them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use passerelle_core::types::EntityType;

use crate::error::SyncError;

/// One record that failed inside an otherwise-successful batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordError {
    /// Identifier of the failed record in the *source* store.
    pub source_id: String,
    pub message: String,
}

impl RecordError {
    pub fn new(source_id: impl Into<String>, error: &SyncError) -> Self {
        Self {
            source_id: source_id.into(),
            message: error.to_string(),
        }
    }
}

/// Aggregated counts of one push or pull step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SyncCounts {
    pub inserted: u64,
    pub updated: u64,
    /// Records seen in the source store, including failed ones.
    pub total: u64,
    pub errors: Vec<RecordError>,
}

/// Outcome of a single push or pull step inside a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum StepOutcome {
    /// The step ran to completion (possibly with per-record errors).
    Completed { counts: SyncCounts },
    /// The step failed fatally (store unreachable); no counts available.
    Failed { error: String },
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }

    pub fn counts(&self) -> Option<&SyncCounts> {
        match self {
            StepOutcome::Completed { counts } => Some(counts),
            StepOutcome::Failed { .. } => None,
        }
    }
}

/// Push and pull outcomes for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRunReport {
    pub push: StepOutcome,
    pub pull: StepOutcome,
}

impl EntityRunReport {
    pub fn steps(&self) -> [&StepOutcome; 2] {
        [&self.push, &self.pull]
    }
}

/// Result of a full run: push then pull for each entity type, in the fixed
/// users-then-reports order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRunReport {
    pub users: EntityRunReport,
    pub reports: EntityRunReport,
}

impl SyncRunReport {
    fn steps(&self) -> [&StepOutcome; 4] {
        [
            &self.users.push,
            &self.users.pull,
            &self.reports.push,
            &self.reports.pull,
        ]
    }

    /// The run as a whole only counts as a fatal failure when every step
    /// failed; anything else is partial success.
    pub fn all_failed(&self) -> bool {
        self.steps().iter().all(|s| s.is_failure())
    }

    pub fn any_succeeded(&self) -> bool {
        !self.all_failed()
    }
}

/// Mapping coverage for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStatus {
    pub total_relational: u64,
    pub mapped: u64,
    pub unmapped: u64,
}

impl EntityStatus {
    /// `unmapped` cannot go negative even if a mapping outlived its record
    /// (deleted out-of-band).
    pub fn new(total_relational: u64, mapped: u64) -> Self {
        Self {
            total_relational,
            mapped,
            unmapped: total_relational.saturating_sub(mapped),
        }
    }
}

/// On-demand mapping coverage across entity types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub users: EntityStatus,
    pub reports: EntityStatus,
    /// `updated_at` of the most recently touched mapping; absent before the
    /// first sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
}

impl StatusReport {
    pub fn entity(&self, entity_type: EntityType) -> &EntityStatus {
        match entity_type {
            EntityType::User => &self.users,
            EntityType::Report => &self.reports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(inserted: u64) -> StepOutcome {
        StepOutcome::Completed {
            counts: SyncCounts {
                inserted,
                ..SyncCounts::default()
            },
        }
    }

    fn failed() -> StepOutcome {
        StepOutcome::Failed {
            error: "store unavailable".to_owned(),
        }
    }

    #[test]
    fn run_fails_only_when_every_step_fails() {
        let partial = SyncRunReport {
            users: EntityRunReport {
                push: failed(),
                pull: completed(1),
            },
            reports: EntityRunReport {
                push: failed(),
                pull: failed(),
            },
        };
        assert!(!partial.all_failed());
        assert!(partial.any_succeeded());

        let total = SyncRunReport {
            users: EntityRunReport {
                push: failed(),
                pull: failed(),
            },
            reports: EntityRunReport {
                push: failed(),
                pull: failed(),
            },
        };
        assert!(total.all_failed());
    }

    #[test]
    fn unmapped_never_negative() {
        let status = EntityStatus::new(3, 7);
        assert_eq!(status.unmapped, 0);
    }

    #[test]
    fn step_outcome_serializes_tagged() {
        let json = serde_json::to_value(completed(2)).unwrap();
        assert_eq!(json["outcome"], "completed");
        assert_eq!(json["counts"]["inserted"], 2);

        let json = serde_json::to_value(failed()).unwrap();
        assert_eq!(json["outcome"], "failed");
    }
}
