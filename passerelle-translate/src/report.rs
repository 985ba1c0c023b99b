//! Signalement translators.

use chrono::{DateTime, Utc};
use serde_json::json;

use passerelle_core::types::{
    Document, ExternalId, PointFields, ReportFields, ReportWithAssociations, UserId,
    STATUS_NEW_ID,
};

use crate::value::{f64_field, i64_field, str_field};

/// Document → relational field set.
///
/// The reporting user arrives as a document-store id
/// (`utilisateur_firebase_id`); the engine resolves it against the identity
/// map and hands the relational id in as `reporter`. A document without a
/// status reference resolves to the "nouveau" default.
pub fn report_to_relational(doc: &Document, reporter: Option<UserId>) -> ReportFields {
    ReportFields {
        description: str_field(doc, "description").unwrap_or_default(),
        user_id: reporter,
        status_id: Some(i64_field(doc, "status_id").unwrap_or(STATUS_NEW_ID)),
        point: embedded_point(doc),
    }
}

fn embedded_point(doc: &Document) -> Option<PointFields> {
    let point = doc.get("point")?;
    Some(PointFields {
        latitude: f64_field(point, "latitude")?,
        longitude: f64_field(point, "longitude")?,
        city_id: i64_field(point, "city_id"),
    })
}

/// Relational record (with resolved associations) → document field set.
///
/// `reporter` is the reporting user's *document* id, already resolved by the
/// engine via the identity map — absent when the user has no mapping yet.
pub fn report_to_document(
    assoc: &ReportWithAssociations,
    reporter: Option<&ExternalId>,
    synced_at: DateTime<Utc>,
) -> Document {
    json!({
        "description": assoc.report.description,
        "utilisateur_firebase_id": reporter.map(|id| id.0.clone()),
        "point": assoc.point.as_ref().map(|p| json!({
            "latitude": p.latitude,
            "longitude": p.longitude,
            "city_id": p.city_id,
        })),
        "status_id": assoc.status.as_ref().map(|s| s.id),
        "status_label": assoc.status.as_ref().map(|s| s.label.clone()),
        "synced_at": synced_at.to_rfc3339(),
    })
}
