//! # passerelle-sync
//!
//! Mapping-table-driven reconciliation between the relational store and the
//! document store.
//!
//! Build a [`SyncEngine`] from three injected stores and call
//! [`SyncEngine::push`] / [`SyncEngine::pull`] per entity type,
//! [`SyncEngine::sync_all`] for a full run, or [`SyncEngine::status`] for
//! mapping coverage. [`pipeline::run`] is the canonical entrypoint used by
//! the CLI.

pub mod engine;
pub mod error;
pub mod identity_map;
pub mod pipeline;
pub mod report;

pub use engine::SyncEngine;
pub use error::SyncError;
pub use identity_map::{IdentityMapping, JsonMappingStore, MappingStore, MemoryMappingStore};
pub use pipeline::SyncScope;
pub use report::{
    EntityRunReport, EntityStatus, RecordError, StatusReport, StepOutcome, SyncCounts,
    SyncRunReport,
};
