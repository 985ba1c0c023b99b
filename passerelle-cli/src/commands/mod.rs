//! Subcommand implementations plus the shared data-directory plumbing.

pub mod seed;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use passerelle_store::{JsonDocumentStore, JsonRelationalStore};
use passerelle_sync::{JsonMappingStore, SyncEngine};

/// The engine every subcommand operates, backed by the JSON file stores.
pub type JsonEngine = SyncEngine<JsonRelationalStore, JsonDocumentStore, JsonMappingStore>;

/// Where the store files live.
///
/// Resolution order: `--data-dir`, then `$PASSERELLE_DATA`, then
/// `~/.passerelle`.
#[derive(Args, Debug, Clone)]
pub struct DataDirArgs {
    /// Directory holding relational.json, documents.json and mappings.json.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

impl DataDirArgs {
    pub fn resolve(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        if let Ok(dir) = std::env::var("PASSERELLE_DATA") {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        let home = dirs::home_dir().context("could not determine home directory")?;
        Ok(home.join(".passerelle"))
    }
}

/// Opens the three JSON stores under `data_dir` and wires them into an
/// engine. Missing files open as empty (or seeded) stores.
pub fn open_engine(data_dir: &Path) -> Result<JsonEngine> {
    let relational = JsonRelationalStore::open(JsonRelationalStore::path_at(data_dir))
        .with_context(|| format!("failed to open relational store in {}", data_dir.display()))?;
    let documents = JsonDocumentStore::open(JsonDocumentStore::path_at(data_dir))
        .with_context(|| format!("failed to open document store in {}", data_dir.display()))?;
    let mappings = JsonMappingStore::open(JsonMappingStore::path_at(data_dir))
        .with_context(|| format!("failed to open mapping store in {}", data_dir.display()))?;
    Ok(SyncEngine::new(relational, documents, mappings))
}
