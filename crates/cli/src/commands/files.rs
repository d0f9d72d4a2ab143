use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::info;
use workbench_core::db::{FileUpdate, NewFile};
use workbench_core::services::decompile::decompile_exe;

use crate::commands::{open_workspace, print_json, read_content};
use crate::{canonicalize_or_current, sha256_file};

/// Store source text under a project.
pub fn add_code_command(
    root: &str,
    project: &str,
    filename: &str,
    content: Option<String>,
    from_file: Option<&str>,
) -> Result<()> {
    let ctx = open_workspace(root)?;
    let content = read_content(content, from_file)?;
    let record = ctx.db.require_project(project)?;
    let file = ctx
        .db
        .insert_file(record.id, &NewFile::new(filename, content))
        .context("Failed to insert file record")?;

    println!("Added code:");
    println!("  File id: {}", file.id);
    println!("  Project: {}", record.name);
    println!("  Filename: {}", file.filename);
    println!("  Bytes: {}", file.content.len());

    Ok(())
}

/// Copy an executable into `uploads/<project>/` and store its decompiled text.
pub fn add_exe_command(root: &str, project: &str, path: &str) -> Result<()> {
    let ctx = open_workspace(root)?;
    let record = ctx.db.require_project(project)?;

    let input_path = Path::new(path);
    let abs_path = if input_path.is_absolute() {
        input_path.to_path_buf()
    } else {
        canonicalize_or_current(".")?.join(input_path)
    };
    if !abs_path.is_file() {
        return Err(anyhow!("Executable does not exist: {}", abs_path.display()));
    }

    let filename = abs_path
        .file_name()
        .and_then(|os| os.to_str())
        .ok_or_else(|| anyhow!("Executable path has no file name: {}", abs_path.display()))?
        .to_string();

    let upload_dir = ctx.layout.project_uploads_dir(&record.name);
    fs::create_dir_all(&upload_dir)
        .with_context(|| format!("Failed to create uploads dir: {}", upload_dir.display()))?;
    let stored_path = upload_dir.join(&filename);
    fs::copy(&abs_path, &stored_path).with_context(|| {
        format!("Failed to copy {} to {}", abs_path.display(), stored_path.display())
    })?;
    let hash = sha256_file(&stored_path)?;
    info!("stored executable {} (sha256 {})", stored_path.display(), hash);

    let content = decompile_exe(&stored_path);
    let file = ctx
        .db
        .insert_file(record.id, &NewFile::new(&filename, content))
        .context("Failed to insert file record")?;

    println!("Added executable:");
    println!("  File id: {}", file.id);
    println!("  Project: {}", record.name);
    println!("  Filename: {}", file.filename);
    println!("  Stored at: {}", stored_path.display());
    println!("  SHA-256: {}", hash);

    Ok(())
}

/// List the files stored under a project.
pub fn list_files_command(root: &str, project: &str, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let record = ctx.db.require_project(project)?;
    let files = ctx.db.list_files(record.id).context("Failed to list files")?;

    if json {
        return print_json(&files, "files");
    }

    println!("Files in {} ({}):", record.name, files.len());
    if files.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for f in files {
        println!("  - [{}] {} ({} bytes)", f.id, f.filename, f.content.len());
    }

    Ok(())
}

/// Overwrite the filename and/or content of a stored file.
pub fn update_file_command(
    root: &str,
    project: &str,
    file_id: i64,
    filename: Option<String>,
    content: Option<String>,
    from_file: Option<&str>,
) -> Result<()> {
    let ctx = open_workspace(root)?;
    let record = ctx.db.require_project(project)?;

    let content = if content.is_some() || from_file.is_some() {
        Some(read_content(content, from_file)?)
    } else {
        None
    };
    let update = FileUpdate { filename, content };
    if update.is_empty() {
        return Err(anyhow!("Nothing to update; pass --filename, --content or --from-file"));
    }

    let file = ctx
        .db
        .update_file(record.id, file_id, &update)
        .with_context(|| format!("Failed to update file {} in project '{}'", file_id, project))?;

    println!("Updated file:");
    println!("  File id: {}", file.id);
    println!("  Filename: {}", file.filename);
    println!("  Bytes: {}", file.content.len());

    Ok(())
}
