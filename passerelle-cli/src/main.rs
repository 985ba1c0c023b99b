//! Passerelle — dual-store reconciliation CLI.
//!
//! # Usage
//!
//! ```text
//! passerelle sync [user|report] [--json] [--data-dir <dir>]
//! passerelle status [--json] [--data-dir <dir>]
//! passerelle seed [--data-dir <dir>]
//! ```
//!
//! Store files live under a data directory resolved from `--data-dir`, then
//! `$PASSERELLE_DATA`, then `~/.passerelle`.

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{seed::SeedArgs, status::StatusArgs, sync::SyncArgs};
use passerelle_core::types::EntityType;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "passerelle",
    version,
    about = "Reconcile the document store and the relational store",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run push then pull for one entity type, or all of them.
    Sync(SyncArgs),

    /// Show mapping coverage per entity type and the last sync time.
    Status(StatusArgs),

    /// Load a small demo dataset into the document store.
    Seed(SeedArgs),
}

// ---------------------------------------------------------------------------
// Shared EntityType argument — parsed from CLI strings, converts to core type
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `EntityType` from CLI args.
#[derive(Debug, Clone)]
pub struct EntityTypeArg(pub EntityType);

impl FromStr for EntityTypeArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        EntityType::from_str(s).map(Self)
    }
}

impl fmt::Display for EntityTypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<EntityTypeArg> for EntityType {
    fn from(e: EntityTypeArg) -> Self {
        e.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Seed(args) => args.run(),
    }
}
