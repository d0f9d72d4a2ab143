//! Workspace database integration and workspace layout definitions.
//!
//! This module wraps a SQLite database storing projects and everything a
//! project owns:
//! - Files (uploaded source or decompiler output)
//! - Analysis results
//! - Per-variable fuzz statistics
//!
//! Alongside the database it defines:
//! - `WorkbenchConfig`: serializable workspace metadata.
//! - `WorkspaceLayout`: computed paths for workspace directories/files.
//! - `WorkspaceContext`: layout + config + open database in one value.

pub mod config;
pub mod context;
pub mod layout;
pub mod models;
pub mod project_db;
pub mod util;

pub use config::*;
pub use context::*;
pub use layout::*;
pub use models::*;
pub use project_db::*;
pub use util::*;
