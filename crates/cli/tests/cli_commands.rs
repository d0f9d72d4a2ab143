use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;
use workbench_core::db::{
    load_workspace_config, save_workspace_config, GeneratorConfig, WorkspaceLayout,
};

const SNIPPET: &str = "int main(){ int var1 = 0; int var2 = 1; return var1 + var2; }";

fn workbench() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fuzz-workbench");
    cmd.env_remove("WORKBENCH_GENERATOR");
    cmd
}

fn root_str(root: &Path) -> &str {
    root.to_str().expect("utf8 root")
}

fn init_with_project(root: &Path, project: &str) {
    workbench().args(["init-workspace", "--root", root_str(root)]).assert().success();
    workbench()
        .args(["create-project", "--root", root_str(root), "--name", project])
        .assert()
        .success();
}

fn add_snippet(root: &Path, project: &str) {
    workbench()
        .args([
            "add-code",
            "--root",
            root_str(root),
            "--project",
            project,
            "--filename",
            "main.c",
            "--content",
            SNIPPET,
        ])
        .assert()
        .success();
}

#[test]
fn init_workspace_creates_layout() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();

    workbench()
        .args(["init-workspace", "--root", root_str(root), "--name", "lab"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized workspace:"))
        .stdout(predicate::str::contains("Name: lab"));

    let layout = WorkspaceLayout::new(root);
    assert!(layout.config_path.is_file());
    assert!(layout.db_path.is_file());
    assert!(layout.reports_dir.is_dir());
    assert!(layout.uploads_dir.is_dir());
}

#[test]
fn init_workspace_twice_fails() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    workbench().args(["init-workspace", "--root", root_str(root)]).assert().success();
    workbench()
        .args(["init-workspace", "--root", root_str(root)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_workspace_uses_current_dir_by_default() {
    let dir = tempdir().expect("tempdir");
    workbench().current_dir(dir.path()).arg("init-workspace").assert().success();
    assert!(WorkspaceLayout::new(dir.path()).config_path.is_file());
}

#[test]
fn workspace_info_fails_without_config() {
    let dir = tempdir().expect("tempdir");
    workbench()
        .args(["workspace-info", "--root", root_str(dir.path())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read workspace config"));
}

#[test]
fn workspace_info_json_lists_projects() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_with_project(root, "demo");

    let out = workbench()
        .args(["workspace-info", "--root", root_str(root), "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let info: serde_json::Value = serde_json::from_slice(&out).expect("json");
    assert_eq!(info["default_iterations"], 100);
    assert!(info["generator"].is_null());
    assert_eq!(info["projects"][0]["name"], "demo");
    assert_eq!(info["projects"][0]["files"], 0);
}

#[test]
fn duplicate_project_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_with_project(root, "demo");
    workbench()
        .args(["create-project", "--root", root_str(root), "--name", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to create project 'demo'"));
}

#[test]
fn end_to_end_fuzz_analyze_report() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_with_project(root, "demo");
    add_snippet(root, "demo");

    workbench()
        .args(["select-targets", "--root", root_str(root), "--project", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- var1"))
        .stdout(predicate::str::contains("- var2"));

    let out = workbench()
        .args(["fuzz", "--root", root_str(root), "--project", "demo", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let fuzz: serde_json::Value = serde_json::from_slice(&out).expect("json");
    let results = fuzz["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["variable"], "var1");
    assert_eq!(results[1]["variable"], "var2");
    for r in results {
        assert_eq!(r["iterations"], 100);
        assert!(r["errors"].as_u64().expect("errors") <= 100);
        for key in ["duration", "memory_kb", "cpu_time"] {
            assert!(r[key].is_number(), "{key} missing");
        }
    }
    assert_eq!(fuzz["stubbed"], serde_json::json!(["int", "main", "return"]));

    workbench()
        .args(["analyze", "--root", root_str(root), "--project", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No vulnerabilities found"));

    workbench()
        .args(["report", "--root", root_str(root), "--project", "demo", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Project report: demo"))
        .stdout(predicate::str::contains("| var1 | 100 |"))
        .stdout(predicate::str::contains("| var2 | 100 |"));

    let layout = WorkspaceLayout::new(root);
    let (json_path, md_path) = layout.report_paths("demo");
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(json_path).expect("report json")).expect("parse");
    assert_eq!(report["files"], serde_json::json!(["main.c"]));
    assert_eq!(report["analyses"], serde_json::json!(["No vulnerabilities found"]));
    assert_eq!(report["fuzz_stats"].as_array().map(Vec::len), Some(2));
    assert!(fs::read_to_string(md_path).expect("report md").contains("## Fuzz stats (2,"));
}

#[test]
fn fuzz_honours_iterations_flag() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_with_project(root, "demo");
    add_snippet(root, "demo");

    workbench()
        .args(["fuzz", "--root", root_str(root), "--project", "demo", "--iterations", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("var1 iterations=7"))
        .stdout(predicate::str::contains("var2 iterations=7"));
}

#[test]
fn stub_prints_stubbed_code() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_with_project(root, "demo");
    add_snippet(root, "demo");

    workbench()
        .args(["stub", "--root", root_str(root), "--project", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stubbed identifiers: int, main, return"))
        .stdout(predicate::str::contains("0 /* stub */ var1 = 0;"));
}

#[test]
fn configured_generator_output_is_used_for_analysis() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_with_project(root, "demo");
    add_snippet(root, "demo");

    let layout = WorkspaceLayout::new(root);
    let mut config = load_workspace_config(&layout).expect("config");
    let mut generator = GeneratorConfig::new("sh");
    generator.args = vec!["-c".into(), "cat >/dev/null; echo 'var2 may overflow'".into()];
    config.generator = Some(generator);
    save_workspace_config(&layout, &config).expect("save config");

    workbench()
        .args(["analyze", "--root", root_str(root), "--project", "demo", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("var2 may overflow"));
}

#[test]
fn missing_generator_program_falls_back() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_with_project(root, "demo");
    add_snippet(root, "demo");

    workbench()
        .env("WORKBENCH_GENERATOR", root.join("no-such-generator"))
        .args(["analyze", "--root", root_str(root), "--project", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No vulnerabilities found"));
}

#[test]
fn add_exe_copies_into_uploads() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_with_project(root, "demo");
    let exe = root.join("game.exe");
    fs::write(&exe, b"MZ\x90\x00").expect("write exe");

    workbench()
        .args(["add-exe", "--root", root_str(root), "--project", "demo", "--path"])
        .arg(&exe)
        .assert()
        .success()
        .stdout(predicate::str::contains("Filename: game.exe"));

    let stored = WorkspaceLayout::new(root).project_uploads_dir("demo").join("game.exe");
    assert_eq!(fs::read(&stored).expect("stored copy"), b"MZ\x90\x00");

    workbench()
        .args(["list-files", "--root", root_str(root), "--project", "demo", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("// Decompiled code from"));
}

#[test]
fn add_code_requires_a_source() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_with_project(root, "demo");
    workbench()
        .args(["add-code", "--root", root_str(root), "--project", "demo", "--filename", "a.c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Provide --content or --from-file"));
}

#[test]
fn fuzz_on_unknown_project_fails() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    workbench().args(["init-workspace", "--root", root_str(root)]).assert().success();
    workbench()
        .args(["fuzz", "--root", root_str(root), "--project", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project not found: ghost"));
}

#[test]
fn delete_project_removes_it_from_listing() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_with_project(root, "demo");
    workbench()
        .args(["delete-project", "--root", root_str(root), "--name", "demo"])
        .assert()
        .success();
    workbench()
        .args(["list-projects", "--root", root_str(root)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Projects (0):"));
}

#[test]
fn delete_project_removes_uploaded_executables() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_with_project(root, "demo");
    let exe = root.join("game.exe");
    fs::write(&exe, b"MZ").expect("write exe");

    workbench()
        .args(["add-exe", "--root", root_str(root), "--project", "demo", "--path"])
        .arg(&exe)
        .assert()
        .success();
    let uploads = WorkspaceLayout::new(root).project_uploads_dir("demo");
    assert!(uploads.join("game.exe").is_file());

    workbench()
        .args(["delete-project", "--root", root_str(root), "--name", "demo"])
        .assert()
        .success();
    assert!(!uploads.exists());

    // A recreated project starts with an empty upload directory.
    workbench()
        .args(["create-project", "--root", root_str(root), "--name", "demo"])
        .assert()
        .success();
    assert!(!uploads.join("game.exe").exists());
}
