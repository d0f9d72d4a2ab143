//! workbench-core
//!
//! Core library for the fuzz workbench.
//!
//! This crate defines the persisted data model, the SQLite project database,
//! and the services that make up the mock pipeline:
//! - target variable selection
//! - stub generation (optionally enhanced by a text-generation collaborator)
//! - the mock fuzz runner and its resource probe
//! - the analysis stub
//! - the workflow coordinator that ties them to stored projects
//!
//! All substantive logic lives here so it is testable without the CLI.

pub mod db;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
