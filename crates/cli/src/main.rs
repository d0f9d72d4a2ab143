use anyhow::Result;
use clap::{Parser, Subcommand};
use fuzz_workbench::commands::*;
use fuzz_workbench::init_logger;

/// Workbench for mock stubbing, fuzzing and analysis of source snippets.
///
/// This CLI is a thin wrapper around `workbench-core` (exposed in code as
/// `workbench_core`). Each invocation opens the workspace, performs one step
/// and exits.
#[derive(Parser, Debug)]
#[command(
    name = "fuzz-workbench",
    version,
    about = "Mock stubbing, fuzzing and analysis of source snippets",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new workspace at the given root.
    ///
    /// This will:
    /// - Create a `.workbench` metadata directory with config and database.
    /// - Create `reports` and `uploads` directories.
    InitWorkspace {
        /// Workspace root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional workspace name. If omitted, the name is derived from the root directory.
        #[arg(long)]
        name: Option<String>,

        /// Iterations per variable used by `fuzz` when `--iterations` is not given.
        #[arg(long)]
        default_iterations: Option<u32>,
    },

    /// Show paths, config, generator and project counts for a workspace.
    WorkspaceInfo {
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Create a project. Names are unique.
    CreateProject {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        name: String,
    },

    /// List projects with file, analysis and fuzz-stat counts.
    ListProjects {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Delete a project and everything it owns.
    DeleteProject {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        name: String,
    },

    /// Store source text under a project.
    AddCode {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        project: String,

        /// File name recorded for the snippet.
        #[arg(long)]
        filename: String,

        /// Inline source text.
        #[arg(long, conflicts_with = "from_file")]
        content: Option<String>,

        /// Read source text from this path.
        #[arg(long)]
        from_file: Option<String>,
    },

    /// Copy an executable into `uploads/` and store its decompiled text.
    AddExe {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        project: String,

        /// Path to the executable.
        #[arg(long)]
        path: String,
    },

    /// List files stored under a project.
    ListFiles {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        project: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Overwrite a stored file in place.
    UpdateFile {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        project: String,

        #[arg(long)]
        file_id: i64,

        #[arg(long)]
        filename: Option<String>,

        #[arg(long, conflicts_with = "from_file")]
        content: Option<String>,

        #[arg(long)]
        from_file: Option<String>,
    },

    /// Pick fuzz targets (tokens starting with `var`) from a file.
    SelectTargets {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        project: String,

        /// File to use. Defaults to the project's first file.
        #[arg(long)]
        file_id: Option<i64>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Replace every non-target identifier with a stub.
    Stub {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        project: String,

        #[arg(long)]
        file_id: Option<i64>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Select, stub and fuzz every target, persisting the stats.
    Fuzz {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        project: String,

        #[arg(long)]
        file_id: Option<i64>,

        /// Iterations per variable. Defaults to the workspace setting, then 100.
        #[arg(long)]
        iterations: Option<u32>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Run the mock security review and persist its result.
    Analyze {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        project: String,

        #[arg(long)]
        file_id: Option<i64>,

        /// Free-form notes passed along with the code.
        #[arg(long)]
        notes: Option<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show a project report (files, analyses and fuzz stats).
    Report {
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        project: String,

        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write `reports/<project>.json` and `reports/<project>.md`.
        #[arg(long, default_value_t = false)]
        write: bool,
    },
}

fn main() -> Result<()> {
    init_logger();
    let cli = Cli::parse();

    match cli.command {
        Command::InitWorkspace { root, name, default_iterations } => {
            init_workspace_command(&root, name, default_iterations)?
        }
        Command::WorkspaceInfo { root, json } => workspace_info_command(&root, json)?,
        Command::CreateProject { root, name } => create_project_command(&root, &name)?,
        Command::ListProjects { root, json } => list_projects_command(&root, json)?,
        Command::DeleteProject { root, name } => delete_project_command(&root, &name)?,
        Command::AddCode { root, project, filename, content, from_file } => {
            add_code_command(&root, &project, &filename, content, from_file.as_deref())?
        }
        Command::AddExe { root, project, path } => add_exe_command(&root, &project, &path)?,
        Command::ListFiles { root, project, json } => list_files_command(&root, &project, json)?,
        Command::UpdateFile { root, project, file_id, filename, content, from_file } => {
            update_file_command(&root, &project, file_id, filename, content, from_file.as_deref())?
        }
        Command::SelectTargets { root, project, file_id, json } => {
            select_targets_command(&root, &project, file_id, json)?
        }
        Command::Stub { root, project, file_id, json } => {
            stub_command(&root, &project, file_id, json)?
        }
        Command::Fuzz { root, project, file_id, iterations, json } => {
            fuzz_command(&root, &project, file_id, iterations, json)?
        }
        Command::Analyze { root, project, file_id, notes, json } => {
            analyze_command(&root, &project, file_id, notes.as_deref(), json)?
        }
        Command::Report { root, project, json, write } => {
            report_command(&root, &project, json, write)?
        }
    }

    Ok(())
}
