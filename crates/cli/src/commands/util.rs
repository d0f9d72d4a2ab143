use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use workbench_core::db::WorkspaceContext;
use workbench_core::services::generator::GeneratorHandle;

use crate::canonicalize_or_current;

/// Resolve `root` and open its workspace (config + database).
pub fn open_workspace(root: &str) -> Result<WorkspaceContext> {
    let root_path = canonicalize_or_current(root)?;
    WorkspaceContext::from_root(&root_path)
}

/// Generator handle for a workspace (delegates to core).
pub fn build_generator_handle(ctx: &WorkspaceContext) -> GeneratorHandle {
    ctx.generator_handle()
}

/// Source text from exactly one of `--content` or `--from-file`.
pub fn read_content(content: Option<String>, from_file: Option<&str>) -> Result<String> {
    match (content, from_file) {
        (Some(_), Some(_)) => Err(anyhow!("Pass either --content or --from-file, not both")),
        (Some(text), None) => Ok(text),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read source file {}", path)),
        (None, None) => Err(anyhow!("Provide --content or --from-file")),
    }
}

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}

/// Pretty-print any serializable value as JSON on stdout.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T, what: &str) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {what} to JSON"))?;
    println!("{}", serialized);
    Ok(())
}
