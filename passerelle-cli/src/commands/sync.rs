//! `passerelle sync` — run push then pull against the JSON stores.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use passerelle_core::types::EntityType;
use passerelle_sync::{
    pipeline::{self, SyncScope},
    EntityRunReport, StepOutcome,
};

use crate::commands::{open_engine, DataDirArgs};
use crate::EntityTypeArg;

/// Arguments for `passerelle sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Entity type to sync: user or report (omit to sync everything).
    pub entity: Option<EntityTypeArg>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub data_dir: DataDirArgs,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let data_dir = self.data_dir.resolve()?;
        let mut engine = open_engine(&data_dir)?;

        let scope = match &self.entity {
            Some(entity) => SyncScope::Entity(entity.0),
            None => SyncScope::All,
        };
        let results = pipeline::run(&mut engine, scope);

        if self.json {
            print_json(&results)?;
        } else {
            for (entity_type, report) in &results {
                print_entity(*entity_type, report);
            }
        }

        if results.iter().all(|(_, r)| r.steps().iter().all(|s| s.is_failure())) {
            bail!("sync failed: every step failed");
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct EntityRunJson<'a> {
    entity: EntityType,
    push: &'a StepOutcome,
    pull: &'a StepOutcome,
}

fn print_json(results: &[(EntityType, EntityRunReport)]) -> Result<()> {
    let payload: Vec<EntityRunJson> = results
        .iter()
        .map(|(entity, report)| EntityRunJson {
            entity: *entity,
            push: &report.push,
            pull: &report.pull,
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize sync JSON")?
    );
    Ok(())
}

fn print_entity(entity_type: EntityType, report: &EntityRunReport) {
    print_step(entity_type, "push", &report.push);
    print_step(entity_type, "pull", &report.pull);
}

fn print_step(entity_type: EntityType, direction: &str, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Completed { counts } => {
            let mark = if counts.errors.is_empty() {
                "✓".green().bold()
            } else {
                "!".yellow().bold()
            };
            println!(
                "{mark} {direction} {entity_type}: {} inserted, {} updated, {} errors ({} seen)",
                counts.inserted,
                counts.updated,
                counts.errors.len(),
                counts.total,
            );
            for error in &counts.errors {
                println!("    {} {}: {}", "·".bright_black(), error.source_id, error.message);
            }
        }
        StepOutcome::Failed { error } => {
            println!("{} {direction} {entity_type}: {error}", "✗".red().bold());
        }
    }
}
