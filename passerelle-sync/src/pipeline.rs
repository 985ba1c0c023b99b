//! Run orchestration on top of [`SyncEngine`].
//!
//! A scope selects which entity types a run covers; [`run`] executes the
//! push-then-pull pair for each selected type in the fixed users-then-reports
//! order and returns one report per type.

use passerelle_core::types::EntityType;
use passerelle_store::{DocumentStore, RelationalStore};

use crate::engine::SyncEngine;
use crate::identity_map::MappingStore;
use crate::report::EntityRunReport;

/// Which entity types a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncScope {
    /// Every entity type, in the fixed order.
    All,
    /// A single entity type.
    Entity(EntityType),
}

impl SyncScope {
    fn entity_types(&self) -> Vec<EntityType> {
        match self {
            SyncScope::All => EntityType::all().to_vec(),
            SyncScope::Entity(entity_type) => vec![*entity_type],
        }
    }
}

/// Runs push then pull for every entity type in scope. Step failures are
/// captured in the per-entity reports, never propagated; a failed user step
/// does not stop the report steps.
pub fn run<R, D, M>(
    engine: &mut SyncEngine<R, D, M>,
    scope: SyncScope,
) -> Vec<(EntityType, EntityRunReport)>
where
    R: RelationalStore,
    D: DocumentStore,
    M: MappingStore,
{
    scope
        .entity_types()
        .into_iter()
        .map(|entity_type| {
            tracing::info!("syncing {entity_type}");
            (entity_type, engine.sync_entity(entity_type))
        })
        .collect()
}
