//! `passerelle seed` — load a demo dataset into the document store.
//!
//! Seeds a handful of users and signalements the way mobile clients would
//! have written them, so a following `passerelle sync` has something to
//! reconcile. Existing documents under the same ids are overwritten;
//! everything else is left alone.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use passerelle_core::types::{Document, ExternalId};
use passerelle_store::JsonDocumentStore;

use crate::commands::DataDirArgs;

/// Arguments for `passerelle seed`.
#[derive(Args, Debug)]
pub struct SeedArgs {
    #[command(flatten)]
    pub data_dir: DataDirArgs,
}

impl SeedArgs {
    pub fn run(self) -> Result<()> {
        let data_dir = self.data_dir.resolve()?;
        let mut documents = JsonDocumentStore::open(JsonDocumentStore::path_at(&data_dir))
            .with_context(|| format!("failed to open document store in {}", data_dir.display()))?;

        let users = demo_users();
        let reports = demo_reports();
        for (id, doc) in &users {
            documents
                .insert("users", id.clone(), doc.clone())
                .with_context(|| format!("failed to seed user document {id}"))?;
        }
        for (id, doc) in &reports {
            documents
                .insert("signalements", id.clone(), doc.clone())
                .with_context(|| format!("failed to seed signalement document {id}"))?;
        }

        println!(
            "Seeded {} users and {} signalements into {}",
            users.len(),
            reports.len(),
            data_dir.display(),
        );
        println!("Run 'passerelle sync' to push them into the relational store.");
        Ok(())
    }
}

fn demo_users() -> Vec<(ExternalId, Document)> {
    vec![
        (
            ExternalId::from("fb_amelie"),
            json!({
                "email": "amelie@example.fr",
                "password_hash": "$2b$12$Jp7marSMqGVGbeyJqsVt8u",
                "birth_date": "1991-04-12",
            }),
        ),
        (
            ExternalId::from("fb_karim"),
            json!({
                "email": "karim@example.fr",
                "birth_date": "1987-11-03",
            }),
        ),
        (
            ExternalId::from("fb_sofia"),
            json!({
                "email": "sofia@example.fr",
                // No birth date: mobile signup without the optional field.
            }),
        ),
    ]
}

fn demo_reports() -> Vec<(ExternalId, Document)> {
    vec![
        (
            ExternalId::from("fb_sig_001"),
            json!({
                "description": "Nid de poule avenue de la République",
                "utilisateur_firebase_id": "fb_amelie",
                "point": {"latitude": 48.8672, "longitude": 2.3801, "city_id": 75},
            }),
        ),
        (
            ExternalId::from("fb_sig_002"),
            json!({
                "description": "Lampadaire en panne rue Gambetta",
                "utilisateur_firebase_id": "fb_karim",
                "status_id": 2,
                "point": {"latitude": 45.7640, "longitude": 4.8357, "city_id": 69},
            }),
        ),
        (
            ExternalId::from("fb_sig_003"),
            json!({
                // Anonymous signalement, no reporter and no coordinates.
                "description": "Dépôt sauvage près du canal",
            }),
        ),
    ]
}
