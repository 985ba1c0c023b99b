//! # passerelle-store
//!
//! Store adapters consumed by the reconciliation engine.
//!
//! The engine only ever sees the [`RelationalStore`] and [`DocumentStore`]
//! traits; concrete backends are injected at construction time. This crate
//! ships two reference backends for each trait:
//!
//! - `Memory*` — `BTreeMap`-backed, used as test doubles and fixtures.
//! - `Json*` — whole-state JSON files with atomic `.tmp` + rename writes,
//!   used by the `passerelle` CLI.
//!
//! Scan order is always ascending primary key, so sync runs are
//! reproducible regardless of insertion order.

pub mod error;
pub mod json;
pub mod memory;
mod state;
pub mod traits;

pub use error::StoreError;
pub use json::{JsonDocumentStore, JsonRelationalStore};
pub use memory::{MemoryDocumentStore, MemoryRelationalStore};
pub use traits::{DocumentStore, RelationalStore};
