//! Firmware catalog store and its record types.
//!
//! The catalog is the external collaborator the resolver queries: a keyed
//! store of known firmware records supporting case-insensitive substring
//! search on the software identifier. Here it is realized as a small
//! SQLite wrapper so the whole pipeline is self-contained and testable;
//! the resolver itself only depends on the `CatalogLookup` trait in
//! `crate::resolve`, so other backing stores can be dropped in.

mod catalog_db;
mod models;

pub use catalog_db::{CatalogDb, CatalogError, CatalogResult, CURRENT_SCHEMA_VERSION};
pub use models::{CatalogStats, FirmwareRecord, NewFirmware, RequestRecord, RequestStatus};
