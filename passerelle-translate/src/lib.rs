//! # passerelle-translate
//!
//! Pure record translators between the two store shapes, one pair per
//! entity type.
//!
//! Translators never fail: malformed or missing document fields coerce to
//! `None` (or a named default), and the output is deterministic for
//! identical input — the idempotence of a sync run depends on that. Any
//! lookup that requires the identity map (resolving a reporting user's
//! document id, for instance) is done by the engine and passed in, keeping
//! this crate free of side effects.

mod report;
mod user;
mod value;

pub use report::{report_to_document, report_to_relational};
pub use user::{user_to_document, user_to_relational};
