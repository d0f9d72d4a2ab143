use std::path::{Path, PathBuf};

/// Logical layout of a workspace on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
/// The CLI or other frontends are responsible for actually creating directories
/// and files based on this layout.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    /// Root directory of the workspace.
    pub root: PathBuf,
    /// Directory for internal metadata (.workbench).
    pub meta_dir: PathBuf,
    /// Path to the workspace config file (JSON).
    pub config_path: PathBuf,
    /// Path to the workspace database file.
    pub db_path: PathBuf,
    /// Directory for exported project reports (reports).
    pub reports_dir: PathBuf,
    /// Directory holding copies of uploaded executables (uploads).
    pub uploads_dir: PathBuf,
}

impl WorkspaceLayout {
    /// Compute the default layout for a workspace rooted at `root`.
    ///
    /// This does *not* touch the filesystem.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".workbench");
        let config_path = meta_dir.join("workbench.json");
        let db_path = meta_dir.join("workbench.db");
        let reports_dir = root.join("reports");
        let uploads_dir = root.join("uploads");

        Self { root, meta_dir, config_path, db_path, reports_dir, uploads_dir }
    }

    /// Compute a database path string suitable for storing in `WorkbenchConfig`,
    /// typically as a path relative to `root`.
    pub fn db_path_relative_string(&self) -> String {
        match self.db_path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => self.db_path.to_string_lossy().to_string(),
        }
    }

    /// Per-project directory for uploaded executables.
    pub fn project_uploads_dir(&self, project: &str) -> PathBuf {
        self.uploads_dir.join(project)
    }

    /// Report paths (JSON, Markdown) for a project.
    pub fn report_paths(&self, project: &str) -> (PathBuf, PathBuf) {
        (
            self.reports_dir.join(format!("{project}.json")),
            self.reports_dir.join(format!("{project}.md")),
        )
    }
}
