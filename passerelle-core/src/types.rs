//! Domain types for the Passerelle reconciliation layer.
//!
//! Relational views are typed structs; document views are schema-less
//! [`Document`] values because the document store accepts whatever shape the
//! mobile clients wrote. All types are serializable via serde.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A schema-less document as stored in the document store.
pub type Document = serde_json::Value;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Profile assigned to a user pushed from the document store without an
/// explicit profile reference ("utilisateur", the standard role).
pub const DEFAULT_PROFILE_ID: i64 = 1;

/// Status assigned to a signalement without an explicit status reference
/// ("nouveau").
pub const STATUS_NEW_ID: i64 = 1;

// ---------------------------------------------------------------------------
// Entity types
// ---------------------------------------------------------------------------

/// The kind of record being synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    User,
    Report,
}

impl EntityType {
    /// All entity types, in the fixed order the orchestrator runs them.
    pub fn all() -> &'static [EntityType] {
        &[EntityType::User, EntityType::Report]
    }

    /// Document-store collection holding this entity type.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityType::User => "users",
            EntityType::Report => "signalements",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "user",
            EntityType::Report => "report",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" | "users" => Ok(EntityType::User),
            "report" | "reports" | "signalement" | "signalements" => Ok(EntityType::Report),
            other => Err(format!(
                "unknown entity type '{other}'; expected: user, report"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Id newtypes
// ---------------------------------------------------------------------------

/// Relational id of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Relational id of a signalement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportId(pub i64);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for ReportId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Opaque identifier assigned by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExternalId(pub String);

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ExternalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ExternalId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Derived account state, resolved from the append-only status history
/// (most recent entry wins). Never a mutable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountState {
    #[default]
    Active,
    Blocked,
}

impl fmt::Display for AccountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountState::Active => write!(f, "active"),
            AccountState::Blocked => write!(f, "blocked"),
        }
    }
}

/// Relational view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    /// Unique login email.
    pub email: String,
    /// Absent means the account cannot authenticate with a password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    pub profile_id: i64,
}

/// Mutable user fields, as produced by the document→relational translator.
///
/// Used for both create and update: an update overwrites exactly these
/// fields and leaves the primary key (and anything else) untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFields {
    pub email: String,
    pub password_hash: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub profile_id: i64,
}

// ---------------------------------------------------------------------------
// Signalements
// ---------------------------------------------------------------------------

/// Relational view of a signalement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: ReportId,
    pub description: String,
    /// Reporting user; nullable — anonymous signalements exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_id: Option<i64>,
}

/// A geographic point attached to a signalement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_id: Option<i64>,
}

/// Point coordinates as carried by a translation (no id yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointFields {
    pub latitude: f64,
    pub longitude: f64,
    pub city_id: Option<i64>,
}

/// Mutable signalement fields, as produced by the document→relational
/// translator. Same create/update contract as [`UserFields`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFields {
    pub description: String,
    pub user_id: Option<UserId>,
    pub status_id: Option<i64>,
    /// Embedded coordinates; `None` leaves any existing point untouched.
    pub point: Option<PointFields>,
}

/// A status lookup row (id + display label).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRef {
    pub id: i64,
    pub label: String,
}

/// A signalement joined with the associations the document translator needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportWithAssociations {
    pub report: ReportRecord,
    pub point: Option<Point>,
    pub status: Option<StatusRef>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
