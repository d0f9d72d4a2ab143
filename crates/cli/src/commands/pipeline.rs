use anyhow::{Context, Result};
use serde::Serialize;
use workbench_core::services::probe::ProcessProbe;
use workbench_core::services::workflow::Workbench;

use crate::commands::{build_generator_handle, open_workspace, print_json};

#[derive(Serialize)]
pub struct TargetSelection {
    pub file_id: i64,
    pub filename: String,
    pub targets: Vec<String>,
}

/// Run the variable selector on a stored file.
pub fn select_targets_command(
    root: &str,
    project: &str,
    file_id: Option<i64>,
    json: bool,
) -> Result<()> {
    let ctx = open_workspace(root)?;
    let generator = build_generator_handle(&ctx);
    let bench = Workbench { ctx: &ctx, generator: &generator, probe: &ProcessProbe };
    let (file, targets) = bench.select_targets(project, file_id)?;

    if json {
        let selection = TargetSelection { file_id: file.id, filename: file.filename, targets };
        return print_json(&selection, "targets");
    }

    println!("Targets in {} ({}):", file.filename, targets.len());
    if targets.is_empty() {
        println!("  (none)");
    }
    for t in targets {
        println!("  - {t}");
    }
    Ok(())
}

/// Run the stub generator and print the stubbed code.
pub fn stub_command(root: &str, project: &str, file_id: Option<i64>, json: bool) -> Result<()> {
    let ctx = open_workspace(root)?;
    let generator = build_generator_handle(&ctx);
    let bench = Workbench { ctx: &ctx, generator: &generator, probe: &ProcessProbe };
    let run = bench.stub(project, file_id)?;

    if json {
        return print_json(&run, "stub result");
    }

    println!("Stubbed {} (file id {}):", run.file.filename, run.file.id);
    println!("  Targets kept: {}", join_or_none(&run.targets));
    println!("  Stubbed identifiers: {}", join_or_none(&run.outcome.stubbed));
    println!();
    println!("{}", run.outcome.code);
    Ok(())
}

/// Select, stub and fuzz every target; stats are persisted.
pub fn fuzz_command(
    root: &str,
    project: &str,
    file_id: Option<i64>,
    iterations: Option<u32>,
    json: bool,
) -> Result<()> {
    let ctx = open_workspace(root)?;
    let generator = build_generator_handle(&ctx);
    let bench = Workbench { ctx: &ctx, generator: &generator, probe: &ProcessProbe };
    let outcome = bench
        .fuzz(project, file_id, iterations)
        .with_context(|| format!("Failed to fuzz project '{}'", project))?;

    if json {
        return print_json(&outcome, "fuzz results");
    }

    println!("Fuzzed file id {}:", outcome.file_id);
    println!("  Targets: {}", join_or_none(&outcome.targets));
    println!("  Stubbed identifiers: {}", join_or_none(&outcome.stubbed));
    println!("Results ({}):", outcome.results.len());
    if outcome.results.is_empty() {
        println!("  (none)");
    }
    for s in &outcome.results {
        println!(
            "  - {} iterations={} errors={} duration={:.6}s memory={:.1}KB cpu={:.6}s",
            s.variable, s.iterations, s.errors, s.duration, s.memory_kb, s.cpu_time
        );
    }
    Ok(())
}

/// Run the analysis stub and persist its verdict.
pub fn analyze_command(
    root: &str,
    project: &str,
    file_id: Option<i64>,
    notes: Option<&str>,
    json: bool,
) -> Result<()> {
    let ctx = open_workspace(root)?;
    let generator = build_generator_handle(&ctx);
    let bench = Workbench { ctx: &ctx, generator: &generator, probe: &ProcessProbe };
    let analysis = bench
        .analyze(project, file_id, notes)
        .with_context(|| format!("Failed to analyze project '{}'", project))?;

    if json {
        return print_json(&analysis, "analysis");
    }

    println!("Analysis {} ({}):", analysis.id, analysis.created_at);
    println!("{}", analysis.result);
    Ok(())
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
