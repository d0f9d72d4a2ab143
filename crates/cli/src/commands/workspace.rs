use anyhow::{Context, Result};
use serde::Serialize;
use workbench_core::db::{ProjectSummary, WorkspaceContext};
use workbench_core::services::fuzz::DEFAULT_ITERATIONS;

use crate::commands::{open_workspace, print_dir_status, print_json};
use crate::{canonicalize_or_current, infer_workspace_name};

#[derive(Serialize)]
pub struct WorkspaceInfoSnapshot {
    pub name: String,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub default_iterations: u32,
    pub generator: Option<String>,
    pub layout: WorkspaceInfoLayout,
    pub projects: Vec<ProjectSummary>,
}

#[derive(Serialize)]
pub struct WorkspaceInfoLayout {
    pub meta_dir: String,
    pub reports_dir: String,
    pub uploads_dir: String,
}

/// Initialize a new workspace at `root`.
pub fn init_workspace_command(
    root: &str,
    name: Option<String>,
    default_iterations: Option<u32>,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let workspace_name = name.unwrap_or_else(|| infer_workspace_name(&root_path));
    let ctx = WorkspaceContext::init(&root_path, &workspace_name, default_iterations)?;
    let layout = &ctx.layout;

    println!("Initialized workspace:");
    println!("  Name: {}", ctx.config.name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.config_path.display());
    println!("  DB path (relative): {}", ctx.config.db.path);
    println!("  Reports dir: {}", layout.reports_dir.display());
    println!("  Uploads dir: {}", layout.uploads_dir.display());

    Ok(())
}

/// Show config, paths, generator and per-project counts.
pub fn workspace_info_command(root: &str, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let projects = ctx.db.project_summaries().context("Failed to list projects")?;
    let generator = ctx.config.effective_generator().map(|g| g.command);
    let default_iterations = ctx.config.default_iterations.unwrap_or(DEFAULT_ITERATIONS);
    let layout = &ctx.layout;

    if json {
        let snapshot = WorkspaceInfoSnapshot {
            name: ctx.config.name.clone(),
            root: layout.root.display().to_string(),
            config_file: layout.config_path.display().to_string(),
            config_version: ctx.config.config_version.clone(),
            db_path: ctx.db_path.display().to_string(),
            default_iterations,
            generator,
            layout: WorkspaceInfoLayout {
                meta_dir: layout.meta_dir.display().to_string(),
                reports_dir: layout.reports_dir.display().to_string(),
                uploads_dir: layout.uploads_dir.display().to_string(),
            },
            projects,
        };
        return print_json(&snapshot, "workspace info");
    }

    println!("Workbench Info");
    println!("==============");
    println!("Name: {}", ctx.config.name);
    println!("Root: {}", layout.root.display());
    println!("Config file: {}", layout.config_path.display());
    println!("Config version: {}", ctx.config.config_version);
    println!("DB path (config): {}", ctx.config.db.path);
    println!("Default iterations: {}", default_iterations);
    println!("Generator: {}", generator.as_deref().unwrap_or("(none)"));
    println!();

    println!("Directories:");
    print_dir_status("Meta dir (.workbench)", &layout.meta_dir);
    print_dir_status("Reports dir", &layout.reports_dir);
    print_dir_status("Uploads dir", &layout.uploads_dir);
    println!();
    println!("Projects: {}", projects.len());
    for p in projects {
        println!(
            "- {} (files: {}, analyses: {}, fuzz stats: {})",
            p.project.name, p.files, p.analyses, p.fuzz_stats
        );
    }

    Ok(())
}
