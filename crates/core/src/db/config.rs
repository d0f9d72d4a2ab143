use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable naming a generator program; overrides the config.
pub const GENERATOR_ENV: &str = "WORKBENCH_GENERATOR";

/// Default token budget handed to the text-generation collaborator.
pub const DEFAULT_MAX_TOKENS: usize = 128;

/// Default upper bound on one collaborator call.
pub const DEFAULT_GENERATOR_TIMEOUT_MS: u64 = 30_000;

/// Database location for a workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Path to the workspace database file (typically relative to the workspace root).
    pub path: String,
}

impl DbConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

fn default_timeout_ms() -> u64 {
    DEFAULT_GENERATOR_TIMEOUT_MS
}

/// External text-generation program used to enhance stubs and analyses.
///
/// The program receives the prompt on stdin and must print the generated
/// text on stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl GeneratorConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_ms: DEFAULT_GENERATOR_TIMEOUT_MS,
        }
    }
}

/// Serializable configuration describing a workbench workspace.
///
/// This lives at `.workbench/workbench.json` in the workspace root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbenchConfig {
    /// Human-friendly workspace name.
    pub name: String,
    /// Optional description / notes.
    pub description: Option<String>,
    /// Schema/config version. This is about the config format, not the crate version.
    pub config_version: String,
    /// Database configuration (path is typically relative to the workspace root).
    pub db: DbConfig,
    /// Iteration count used by `fuzz` when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_iterations: Option<u32>,
    /// Optional text-generation collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorConfig>,
}

impl WorkbenchConfig {
    /// Create a new workspace configuration using the given name and db path.
    pub fn new(name: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            db: DbConfig::new(db_path),
            default_iterations: None,
            generator: None,
        }
    }

    /// Database location; relative entries are taken from `root`.
    pub fn resolve_db_path(&self, root: &Path) -> PathBuf {
        let path = Path::new(&self.db.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }

    /// Generator settings after applying the `WORKBENCH_GENERATOR` override.
    ///
    /// The override replaces only the command; args and limits from the
    /// config file are kept when present.
    pub fn effective_generator(&self) -> Option<GeneratorConfig> {
        match std::env::var(GENERATOR_ENV) {
            Ok(cmd) if !cmd.trim().is_empty() => {
                let mut cfg = self.generator.clone().unwrap_or_else(|| GeneratorConfig::new(""));
                cfg.command = cmd;
                Some(cfg)
            }
            _ => self.generator.clone(),
        }
    }
}
