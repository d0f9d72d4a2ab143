use serde::{Deserialize, Serialize};

use crate::services::fuzz::FuzzStat;

/// A project registered in the workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectRecord {
    pub id: i64,
    /// Unique, human-friendly name.
    pub name: String,
    pub created_at: String,
}

/// A named source blob owned by a project.
///
/// Content is either raw uploaded text or decompiler pseudo-output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    pub id: i64,
    pub project_id: i64,
    pub filename: String,
    pub content: String,
}

/// Input for inserting a file; ids are assigned by the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewFile {
    pub filename: String,
    pub content: String,
}

impl NewFile {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self { filename: filename.into(), content: content.into() }
    }
}

/// In-place edit of a stored file. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileUpdate {
    pub filename: Option<String>,
    pub content: Option<String>,
}

impl FileUpdate {
    pub fn is_empty(&self) -> bool {
        self.filename.is_none() && self.content.is_none()
    }
}

/// Stored result of one analysis invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisRecord {
    pub id: i64,
    pub project_id: i64,
    pub result: String,
    pub created_at: String,
}

/// Stored per-variable fuzz statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuzzStatRecord {
    pub id: i64,
    pub project_id: i64,
    #[serde(flatten)]
    pub stat: FuzzStat,
    pub created_at: String,
}

/// Per-project counts used by listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: ProjectRecord,
    pub files: usize,
    pub analyses: usize,
    pub fuzz_stats: usize,
}
