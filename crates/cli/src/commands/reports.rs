use std::fs;

use anyhow::{Context, Result};
use workbench_core::services::probe::ProcessProbe;
use workbench_core::services::workflow::Workbench;

use crate::commands::{build_generator_handle, open_workspace, print_json};

/// Show a project report; `write` also emits JSON and Markdown under `reports/`.
pub fn report_command(root: &str, project: &str, json: bool, write: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let generator = build_generator_handle(&ctx);
    let bench = Workbench { ctx: &ctx, generator: &generator, probe: &ProcessProbe };
    let report = bench.report(project)?;

    if write {
        let (json_path, md_path) = ctx.layout.report_paths(&report.project);
        fs::create_dir_all(&ctx.layout.reports_dir).with_context(|| {
            format!("Failed to create reports dir: {}", ctx.layout.reports_dir.display())
        })?;
        let body = serde_json::to_string_pretty(&report)
            .context("Failed to serialize report to JSON")?;
        fs::write(&json_path, body)
            .with_context(|| format!("Failed to write report {}", json_path.display()))?;
        fs::write(&md_path, report.render_markdown())
            .with_context(|| format!("Failed to write report {}", md_path.display()))?;
        eprintln!("Wrote {} and {}", json_path.display(), md_path.display());
    }

    if json {
        return print_json(&report, "report");
    }

    print!("{}", report.render_markdown());
    Ok(())
}
