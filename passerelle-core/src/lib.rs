//! # passerelle-core
//!
//! Domain types shared by every Passerelle crate: the entity-type enum, id
//! newtypes, the relational views of users and signalements, and the named
//! default constants the translators resolve against.
//!
//! This crate owns no I/O. Store adapters live in `passerelle-store`, the
//! translators in `passerelle-translate`, and the reconciliation engine in
//! `passerelle-sync`.

pub mod types;
