use std::fs;
use std::io::ErrorKind;

use anyhow::{Context, Result};

use crate::commands::{open_workspace, print_json};

/// Create a project; names are unique within a workspace.
pub fn create_project_command(root: &str, name: &str) -> Result<()> {
    let ctx = open_workspace(root)?;
    let project = ctx
        .db
        .create_project(name)
        .with_context(|| format!("Failed to create project '{}'", name))?;

    println!("Created project:");
    println!("  Id: {}", project.id);
    println!("  Name: {}", project.name);
    println!("  Created at: {}", project.created_at);

    Ok(())
}

/// List projects with their file, analysis and fuzz-stat counts.
pub fn list_projects_command(root: &str, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let summaries = ctx.db.project_summaries().context("Failed to list projects")?;

    if json {
        return print_json(&summaries, "projects");
    }

    println!("Projects ({}):", summaries.len());
    if summaries.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for s in summaries {
        println!(
            "  - [{}] {} files={} analyses={} fuzz_stats={}",
            s.project.id, s.project.name, s.files, s.analyses, s.fuzz_stats
        );
    }

    Ok(())
}

/// Delete a project together with its files, analyses, fuzz stats and uploads.
pub fn delete_project_command(root: &str, name: &str) -> Result<()> {
    let ctx = open_workspace(root)?;
    ctx.db
        .delete_project(name)
        .with_context(|| format!("Failed to delete project '{}'", name))?;

    let uploads = ctx.layout.project_uploads_dir(name);
    match fs::remove_dir_all(&uploads) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to remove uploads dir: {}", uploads.display())
            })
        }
    }
    println!("Deleted project: {}", name);
    Ok(())
}
