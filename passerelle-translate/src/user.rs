//! User translators.

use chrono::{DateTime, Utc};
use serde_json::json;

use passerelle_core::types::{Document, UserFields, UserRecord, DEFAULT_PROFILE_ID};

use crate::value::{date_field, i64_field, str_field};

/// Document → relational field set.
///
/// A missing profile reference resolves to the standard-user default; an
/// unparseable birth date becomes `None`, never an error.
pub fn user_to_relational(doc: &Document) -> UserFields {
    UserFields {
        email: str_field(doc, "email").unwrap_or_default(),
        password_hash: str_field(doc, "password_hash"),
        birth_date: date_field(doc, "birth_date"),
        profile_id: i64_field(doc, "profile_id").unwrap_or(DEFAULT_PROFILE_ID),
    }
}

/// Relational record → document field set, stamped with `synced_at`.
pub fn user_to_document(record: &UserRecord, synced_at: DateTime<Utc>) -> Document {
    json!({
        "email": record.email,
        "password_hash": record.password_hash,
        "birth_date": record.birth_date.map(|d| d.to_string()),
        "profile_id": record.profile_id,
        "synced_at": synced_at.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use passerelle_core::types::UserId;
    use serde_json::json;

    use super::*;

    #[test]
    fn full_document_translates() {
        let doc = json!({
            "email": "a@x.com",
            "password_hash": "h1",
            "birth_date": "1990-04-02",
            "profile_id": 2,
        });
        let fields = user_to_relational(&doc);
        assert_eq!(fields.email, "a@x.com");
        assert_eq!(fields.password_hash.as_deref(), Some("h1"));
        assert_eq!(
            fields.birth_date,
            Some(NaiveDate::from_ymd_opt(1990, 4, 2).unwrap())
        );
        assert_eq!(fields.profile_id, 2);
    }

    #[test]
    fn missing_profile_resolves_to_default() {
        let doc = json!({"email": "a@x.com"});
        let fields = user_to_relational(&doc);
        assert_eq!(fields.profile_id, DEFAULT_PROFILE_ID);
        assert_eq!(fields.password_hash, None);
        assert_eq!(fields.birth_date, None);
    }

    #[test]
    fn malformed_document_coerces_instead_of_failing() {
        let doc = json!({"email": 42, "birth_date": "soon", "profile_id": "admin"});
        let fields = user_to_relational(&doc);
        assert_eq!(fields.email, "");
        assert_eq!(fields.birth_date, None);
        assert_eq!(fields.profile_id, DEFAULT_PROFILE_ID);
    }

    #[test]
    fn translation_is_deterministic() {
        let doc = json!({"email": "a@x.com", "password_hash": "h1"});
        assert_eq!(user_to_relational(&doc), user_to_relational(&doc));
    }

    #[test]
    fn record_translates_with_synced_at() {
        let record = UserRecord {
            id: UserId(7),
            email: "a@x.com".to_owned(),
            password_hash: None,
            birth_date: Some(NaiveDate::from_ymd_opt(1990, 4, 2).unwrap()),
            profile_id: 1,
        };
        let now = Utc::now();
        let doc = user_to_document(&record, now);
        assert_eq!(doc["email"], "a@x.com");
        assert_eq!(doc["password_hash"], serde_json::Value::Null);
        assert_eq!(doc["birth_date"], "1990-04-02");
        assert_eq!(doc["synced_at"], now.to_rfc3339());
    }
}
