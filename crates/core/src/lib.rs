//! fwident-core
//!
//! Core library for identifying ECU firmware images against a catalog.
//!
//! This crate defines the result model, the three coordinated matchers
//! (byte signatures, filename tokens, OCR text patterns), the catalog
//! store, and the resolver that ties them together with a defined
//! candidate precedence.
//!
//! The goal is to keep all substantive logic here so it is fully testable
//! and reusable from multiple frontends (CLI, web API, bot, etc.).

pub mod catalog;
pub mod model;
pub mod parse;
pub mod resolve;
pub mod store;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
