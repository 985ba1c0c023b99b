//! `passerelle status` — mapping coverage visibility.

use anyhow::{Context, Result};
use clap::Args;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use passerelle_core::types::EntityType;
use passerelle_sync::StatusReport;

use crate::commands::{open_engine, DataDirArgs};

/// Arguments for `passerelle status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub data_dir: DataDirArgs,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let data_dir = self.data_dir.resolve()?;
        let engine = open_engine(&data_dir)?;
        let report = engine.status().context("failed to compute sync status")?;

        if self.json {
            print_json(&report)?;
            return Ok(());
        }

        print_table(&report);
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusJson<'a> {
    entities: Vec<EntityStatusJson>,
    last_sync_at: &'a Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct EntityStatusJson {
    entity: EntityType,
    total_relational: u64,
    mapped: u64,
    unmapped: u64,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "entity")]
    entity: String,
    #[tabled(rename = "relational")]
    total_relational: u64,
    #[tabled(rename = "mapped")]
    mapped: u64,
    #[tabled(rename = "unmapped")]
    unmapped: u64,
}

fn print_json(report: &StatusReport) -> Result<()> {
    let payload = StatusJson {
        entities: EntityType::all()
            .iter()
            .map(|entity| {
                let status = report.entity(*entity);
                EntityStatusJson {
                    entity: *entity,
                    total_relational: status.total_relational,
                    mapped: status.mapped,
                    unmapped: status.unmapped,
                }
            })
            .collect(),
        last_sync_at: &report.last_sync_at,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(report: &StatusReport) {
    let rows: Vec<StatusTableRow> = EntityType::all()
        .iter()
        .map(|entity| {
            let status = report.entity(*entity);
            StatusTableRow {
                entity: entity.to_string(),
                total_relational: status.total_relational,
                mapped: status.mapped,
                unmapped: status.unmapped,
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    match &report.last_sync_at {
        Some(at) => println!("Last sync: {}", at.to_rfc3339()),
        None => println!("Last sync: {}", "never".bright_black()),
    }

    let unmapped: u64 = EntityType::all()
        .iter()
        .map(|e| report.entity(*e).unmapped)
        .sum();
    if unmapped > 0 {
        println!("Run 'passerelle sync' to map the remaining records.");
    }
}
