use std::fs;

use anyhow::{Context, Result};

use crate::db::{WorkbenchConfig, WorkspaceLayout};

/// Read `.workbench/workbench.json`.
pub fn load_workspace_config(layout: &WorkspaceLayout) -> Result<WorkbenchConfig> {
    let body = fs::read_to_string(&layout.config_path).with_context(|| {
        format!("Failed to read workspace config at {}", layout.config_path.display())
    })?;
    serde_json::from_str(&body).context("Failed to parse workspace config JSON")
}

/// Write the config as pretty JSON, replacing any existing file.
pub fn save_workspace_config(layout: &WorkspaceLayout, config: &WorkbenchConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(&layout.config_path, json).with_context(|| {
        format!("Failed to write workspace config: {}", layout.config_path.display())
    })
}

/// Create the meta, reports and uploads directories.
pub fn create_workspace_dirs(layout: &WorkspaceLayout) -> Result<()> {
    for (label, dir) in [
        ("meta", &layout.meta_dir),
        ("reports", &layout.reports_dir),
        ("uploads", &layout.uploads_dir),
    ] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {label} dir: {}", dir.display()))?;
    }
    Ok(())
}
