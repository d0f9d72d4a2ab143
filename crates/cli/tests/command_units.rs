use std::fs;
use std::path::Path;

use fuzz_workbench::commands::{
    add_code_command, add_exe_command, analyze_command, build_generator_handle,
    create_project_command, delete_project_command, fuzz_command, init_workspace_command,
    list_files_command, list_projects_command, open_workspace, read_content, report_command,
    select_targets_command, stub_command, update_file_command, workspace_info_command,
};
use tempfile::tempdir;
use workbench_core::db::WorkspaceLayout;
use workbench_core::services::generator::TextGenerator;

const SNIPPET: &str = "int main(){ int var1 = 0; int var2 = 1; return var1 + var2; }";

fn root_str(root: &Path) -> &str {
    root.to_str().expect("utf8 root")
}

fn setup(root: &Path) {
    init_workspace_command(root_str(root), Some("units".into()), None).expect("init");
    create_project_command(root_str(root), "demo").expect("create project");
    add_code_command(root_str(root), "demo", "main.c", Some(SNIPPET.into()), None)
        .expect("add code");
}

#[test]
fn read_content_accepts_exactly_one_source() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("a.c");
    fs::write(&path, "int varX;").expect("write");

    assert_eq!(read_content(Some("x".into()), None).expect("inline"), "x");
    assert_eq!(read_content(None, path.to_str()).expect("file"), "int varX;");
    assert!(read_content(None, None).is_err());
    assert!(read_content(Some("x".into()), path.to_str()).is_err());
}

#[test]
fn read_content_reports_missing_file() {
    let err = read_content(None, Some("/definitely/not/here.c")).unwrap_err();
    assert!(err.to_string().contains("Failed to read source file"));
}

#[test]
fn init_records_default_iterations() {
    let tmp = tempdir().expect("tempdir");
    init_workspace_command(root_str(tmp.path()), None, Some(25)).expect("init");
    let ctx = open_workspace(root_str(tmp.path())).expect("open");
    assert_eq!(ctx.config.default_iterations, Some(25));
    assert_eq!(ctx.config.name, tmp.path().file_name().and_then(|n| n.to_str()).expect("name"));
}

#[test]
fn pipeline_commands_persist_results() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path();
    setup(root);

    select_targets_command(root_str(root), "demo", None, true).expect("select");
    stub_command(root_str(root), "demo", None, false).expect("stub");
    fuzz_command(root_str(root), "demo", None, Some(5), false).expect("fuzz");
    analyze_command(root_str(root), "demo", None, Some("check bounds"), true).expect("analyze");

    let ctx = open_workspace(root_str(root)).expect("open");
    let project = ctx.db.require_project("demo").expect("project");
    let stats = ctx.db.list_fuzz_stats(project.id).expect("stats");
    assert_eq!(stats.len(), 2);
    assert!(stats.iter().all(|s| s.stat.iterations == 5));
    let analyses = ctx.db.list_analyses(project.id).expect("analyses");
    assert_eq!(analyses.len(), 1);

    list_projects_command(root_str(root), true).expect("list projects");
    workspace_info_command(root_str(root), false).expect("info");
}

#[test]
fn update_file_changes_content_in_place() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path();
    setup(root);

    let ctx = open_workspace(root_str(root)).expect("open");
    let project = ctx.db.require_project("demo").expect("project");
    let file = ctx.db.first_file(project.id).expect("query").expect("file");

    update_file_command(root_str(root), "demo", file.id, None, Some("int varZ;".into()), None)
        .expect("update");
    let updated = ctx.db.get_file(project.id, file.id).expect("reload");
    assert_eq!(updated.filename, "main.c");
    assert_eq!(updated.content, "int varZ;");

    let err = update_file_command(root_str(root), "demo", file.id, None, None, None).unwrap_err();
    assert!(err.to_string().contains("Nothing to update"));
}

#[test]
fn update_file_rejects_unknown_id() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path();
    setup(root);
    let err = update_file_command(root_str(root), "demo", 999, Some("b.c".into()), None, None)
        .unwrap_err();
    assert!(format!("{err:#}").contains("File not found: 999"));
}

#[test]
fn add_exe_rejects_missing_path() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path();
    setup(root);
    let missing = root.join("nope.exe");
    let err = add_exe_command(root_str(root), "demo", root_str(&missing)).unwrap_err();
    assert!(err.to_string().contains("Executable does not exist"));
}

#[test]
fn report_write_emits_both_formats() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path();
    setup(root);
    fuzz_command(root_str(root), "demo", None, Some(3), true).expect("fuzz");

    report_command(root_str(root), "demo", true, true).expect("report");
    let (json_path, md_path) = WorkspaceLayout::new(root).report_paths("demo");
    assert!(json_path.is_file());
    let md = fs::read_to_string(md_path).expect("md");
    assert!(md.contains("| var1 | 3 |"));
}

#[test]
fn delete_then_list_files_fails() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path();
    setup(root);
    delete_project_command(root_str(root), "demo").expect("delete");
    let err = list_files_command(root_str(root), "demo", false).unwrap_err();
    assert!(err.to_string().contains("Project not found: demo"));
    assert!(delete_project_command(root_str(root), "demo").is_err());
}

#[test]
fn generator_handle_without_config_is_disabled() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path();
    init_workspace_command(root_str(root), None, None).expect("init");
    let ctx = open_workspace(root_str(root)).expect("open");
    if std::env::var_os("WORKBENCH_GENERATOR").is_none() {
        let handle = build_generator_handle(&ctx);
        assert!(handle.config().is_none());
        assert_eq!(handle.get().name(), "none");
    }
}

#[test]
fn escaping_project_name_is_rejected_before_any_write() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path();
    init_workspace_command(root_str(root), None, None).expect("init");

    let err = create_project_command(root_str(root), "../escaped").unwrap_err();
    assert!(format!("{err:#}").contains("Invalid project name"));
    assert!(report_command(root_str(root), "../escaped", false, true).is_err());
    assert!(!root.join("escaped.json").exists());
    assert!(!root.join("escaped.md").exists());
}
