//! Workflow coordinator tying the pipeline steps to stored projects.

use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{AnalysisRecord, DbError, FileRecord, ProjectRecord, WorkspaceContext};
use crate::services::analysis::analyze_code;
use crate::services::fuzz::{FuzzRunner, FuzzStat, DEFAULT_ITERATIONS};
use crate::services::generator::GeneratorHandle;
use crate::services::probe::ResourceProbe;
use crate::services::report::ProjectReport;
use crate::services::selector::select_target_variables;
use crate::services::stubs::{generate_stubs, StubOutcome};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Project '{0}' has no files; add code or an executable first")]
    NoFile(String),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Result of a stub pass over one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StubRun {
    pub file: FileRecord,
    pub targets: Vec<String>,
    pub outcome: StubOutcome,
}

/// Result of a fuzz pass; `results` are also persisted as fuzz stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzOutcome {
    pub file_id: i64,
    pub targets: Vec<String>,
    pub stubbed: Vec<String>,
    pub results: Vec<FuzzStat>,
}

/// Coordinator running the mock pipeline against stored projects.
pub struct Workbench<'a> {
    pub ctx: &'a WorkspaceContext,
    pub generator: &'a GeneratorHandle,
    pub probe: &'a dyn ResourceProbe,
}

impl<'a> Workbench<'a> {
    /// Pick the requested file, or the project's first one.
    pub fn source_file(
        &self,
        project: &ProjectRecord,
        file_id: Option<i64>,
    ) -> WorkflowResult<FileRecord> {
        match file_id {
            Some(id) => Ok(self.ctx.db.get_file(project.id, id)?),
            None => self
                .ctx
                .db
                .first_file(project.id)?
                .ok_or_else(|| WorkflowError::NoFile(project.name.clone())),
        }
    }

    pub fn select_targets(
        &self,
        project: &str,
        file_id: Option<i64>,
    ) -> WorkflowResult<(FileRecord, Vec<String>)> {
        let record = self.ctx.db.require_project(project)?;
        self.select_targets_in(&record, file_id)
    }

    fn select_targets_in(
        &self,
        project: &ProjectRecord,
        file_id: Option<i64>,
    ) -> WorkflowResult<(FileRecord, Vec<String>)> {
        let file = self.source_file(project, file_id)?;
        let targets = select_target_variables(&file.content);
        Ok((file, targets))
    }

    pub fn stub(&self, project: &str, file_id: Option<i64>) -> WorkflowResult<StubRun> {
        let record = self.ctx.db.require_project(project)?;
        self.stub_in(&record, file_id)
    }

    fn stub_in(&self, project: &ProjectRecord, file_id: Option<i64>) -> WorkflowResult<StubRun> {
        let (file, targets) = self.select_targets_in(project, file_id)?;
        let outcome = generate_stubs(
            &file.content,
            &targets,
            self.generator.get(),
            self.generator.max_tokens(),
        );
        info!(
            "stubbed {} identifiers in {} ({} targets kept)",
            outcome.stubbed.len(),
            file.filename,
            targets.len()
        );
        Ok(StubRun { file, targets, outcome })
    }

    /// Select, stub, fuzz each target, and persist the stats.
    pub fn fuzz(
        &self,
        project: &str,
        file_id: Option<i64>,
        iterations: Option<u32>,
    ) -> WorkflowResult<FuzzOutcome> {
        let record = self.ctx.db.require_project(project)?;
        let run = self.stub_in(&record, file_id)?;
        let iterations =
            iterations.or(self.ctx.config.default_iterations).unwrap_or(DEFAULT_ITERATIONS);

        if run.targets.is_empty() {
            warn!("no fuzz targets found in {}", run.file.filename);
        }

        let runner = FuzzRunner::new(self.probe).with_iterations(iterations);
        let results = runner.fuzz_targets(&run.targets);
        self.ctx.db.insert_fuzz_stats(record.id, &results)?;
        info!(
            "fuzzed {} targets in project {} ({} iterations each)",
            results.len(),
            record.name,
            iterations
        );

        Ok(FuzzOutcome {
            file_id: run.file.id,
            targets: run.targets,
            stubbed: run.outcome.stubbed,
            results,
        })
    }

    /// Run the analysis stub and persist its verdict.
    pub fn analyze(
        &self,
        project: &str,
        file_id: Option<i64>,
        notes: Option<&str>,
    ) -> WorkflowResult<AnalysisRecord> {
        let record = self.ctx.db.require_project(project)?;
        let file = self.source_file(&record, file_id)?;
        let result =
            analyze_code(&file.content, notes, self.generator.get(), self.generator.max_tokens());
        let stored = self.ctx.db.insert_analysis(record.id, &result)?;
        info!("stored analysis {} for project {}", stored.id, record.name);
        Ok(stored)
    }

    /// Assemble the persisted state of a project.
    pub fn report(&self, project: &str) -> WorkflowResult<ProjectReport> {
        let record = self.ctx.db.require_project(project)?;
        let files = self.ctx.db.list_files(record.id)?;
        let analyses = self.ctx.db.list_analyses(record.id)?;
        let stats = self.ctx.db.list_fuzz_stats(record.id)?;
        Ok(ProjectReport {
            project_id: record.id,
            project: record.name,
            generated_at: Utc::now().to_rfc3339(),
            files: files.into_iter().map(|f| f.filename).collect(),
            analyses: analyses.into_iter().map(|a| a.result).collect(),
            fuzz_stats: stats.into_iter().map(|s| s.stat).collect(),
        })
    }
}
