//! Field-coercion helpers over schema-less documents.
//!
//! Mobile clients write whatever shape they like; every helper here turns
//! an unexpected shape into `None` rather than an error.

use chrono::{DateTime, NaiveDate};
use passerelle_core::types::Document;

pub(crate) fn str_field(doc: &Document, key: &str) -> Option<String> {
    doc.get(key)?.as_str().map(str::to_owned)
}

pub(crate) fn i64_field(doc: &Document, key: &str) -> Option<i64> {
    doc.get(key)?.as_i64()
}

pub(crate) fn f64_field(doc: &Document, key: &str) -> Option<f64> {
    doc.get(key)?.as_f64()
}

/// Parses a date field written either as a plain `YYYY-MM-DD` or as a full
/// RFC 3339 timestamp. Anything else is `None`.
pub(crate) fn date_field(doc: &Document, key: &str) -> Option<NaiveDate> {
    let raw = doc.get(key)?.as_str()?;
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(json!({"d": "1990-04-02"}), Some((1990, 4, 2)))]
    #[case(json!({"d": "1990-04-02T10:30:00Z"}), Some((1990, 4, 2)))]
    #[case(json!({"d": "not a date"}), None)]
    #[case(json!({"d": 19900402}), None)]
    #[case(json!({}), None)]
    fn date_coercion(#[case] doc: Document, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(date_field(&doc, "d"), expected);
    }

    #[test]
    fn wrong_types_coerce_to_none() {
        let doc = json!({"email": 42, "profile_id": "one", "lat": "48.85"});
        assert_eq!(str_field(&doc, "email"), None);
        assert_eq!(i64_field(&doc, "profile_id"), None);
        assert_eq!(f64_field(&doc, "lat"), None);
    }

    #[test]
    fn integer_is_also_a_float() {
        let doc = json!({"lat": 48});
        assert_eq!(f64_field(&doc, "lat"), Some(48.0));
    }
}
