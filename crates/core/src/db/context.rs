use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{debug, info};

use crate::db::{
    create_workspace_dirs, load_workspace_config, save_workspace_config, ProjectDb,
    WorkbenchConfig, WorkspaceLayout,
};
use crate::services::generator::GeneratorHandle;

/// An opened workspace: where it lives, how it is configured, and its database.
#[derive(Debug)]
pub struct WorkspaceContext {
    pub layout: WorkspaceLayout,
    pub config: WorkbenchConfig,
    /// Database path after resolving the config entry against the root.
    pub db_path: PathBuf,
    pub db: ProjectDb,
}

impl WorkspaceContext {
    /// Open an existing workspace rooted at `root`.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let layout = WorkspaceLayout::new(root);
        let config = load_workspace_config(&layout)?;
        Self::open(layout, config)
    }

    /// Lay out a fresh workspace at `root` and open it.
    ///
    /// Fails if a config already exists; nothing on disk is touched then.
    pub fn init(
        root: impl AsRef<Path>,
        name: &str,
        default_iterations: Option<u32>,
    ) -> Result<Self> {
        let layout = WorkspaceLayout::new(root);
        if layout.config_path.exists() {
            bail!("Workspace already initialized at {}", layout.config_path.display());
        }

        create_workspace_dirs(&layout)?;
        let mut config = WorkbenchConfig::new(name, layout.db_path_relative_string());
        config.default_iterations = default_iterations;
        save_workspace_config(&layout, &config)?;
        info!("initialized workspace {} at {}", name, layout.root.display());

        Self::open(layout, config)
    }

    fn open(layout: WorkspaceLayout, config: WorkbenchConfig) -> Result<Self> {
        let db_path = config.resolve_db_path(&layout.root);
        let db = ProjectDb::open(&db_path)
            .with_context(|| format!("Failed to open workspace database at {}", db_path.display()))?;
        Ok(Self { layout, config, db_path, db })
    }

    /// Generator handle for this workspace, honouring the `WORKBENCH_GENERATOR` override.
    pub fn generator_handle(&self) -> GeneratorHandle {
        let config = self.config.effective_generator();
        match &config {
            Some(cfg) => debug!("using generator command {}", cfg.command),
            None => debug!("no generator configured; local fallbacks only"),
        }
        GeneratorHandle::new(config)
    }
}
