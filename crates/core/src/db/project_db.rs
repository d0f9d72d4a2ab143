use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::db::{
    AnalysisRecord, FileRecord, FileUpdate, FuzzStatRecord, NewFile, ProjectRecord, ProjectSummary,
};
use crate::services::fuzz::FuzzStat;

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for project database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },

    /// A project with this name already exists.
    #[error("Project '{0}' already exists")]
    DuplicateProject(String),

    /// Project names become directory and file names under the workspace.
    #[error("Invalid project name '{0}': must be non-empty and contain no path separators or '..'")]
    InvalidProjectName(String),

    /// Lookup by name or id found nothing.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
}

impl DbError {
    fn not_found(entity: &'static str, key: impl ToString) -> Self {
        DbError::NotFound { entity, key: key.to_string() }
    }
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed workspace database.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Providing small, testable helpers for querying and updating records.
///
/// Projects own their files, analyses and fuzz stats; deleting a project
/// cascades through foreign keys.
#[derive(Debug)]
pub struct ProjectDb {
    conn: Connection,
}

impl ProjectDb {
    /// Open (or create) a database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create a project. Names are unique and must be usable as a single path component.
    pub fn create_project(&self, name: &str) -> DbResult<ProjectRecord> {
        if !is_valid_project_name(name) {
            return Err(DbError::InvalidProjectName(name.to_string()));
        }
        let created_at = Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT INTO projects (name, created_at) VALUES (?1, ?2)",
            params![name, created_at],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(DbError::DuplicateProject(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        Ok(ProjectRecord { id: self.conn.last_insert_rowid(), name: name.to_string(), created_at })
    }

    /// List all projects (ordered by id).
    pub fn list_projects(&self) -> DbResult<Vec<ProjectRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, created_at
            FROM projects
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], map_project)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Look up a project by name.
    pub fn find_project(&self, name: &str) -> DbResult<Option<ProjectRecord>> {
        let project = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM projects WHERE name = ?1",
                params![name],
                map_project,
            )
            .optional()?;
        Ok(project)
    }

    /// Look up a project by name, failing with `NotFound` when absent.
    pub fn require_project(&self, name: &str) -> DbResult<ProjectRecord> {
        self.find_project(name)?.ok_or_else(|| DbError::not_found("Project", name))
    }

    /// Look up a project by id.
    pub fn project_by_id(&self, id: i64) -> DbResult<Option<ProjectRecord>> {
        let project = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM projects WHERE id = ?1",
                params![id],
                map_project,
            )
            .optional()?;
        Ok(project)
    }

    /// Delete a project and (via cascade) everything it owns.
    ///
    /// Returns `NotFound` if no project has this name.
    pub fn delete_project(&self, name: &str) -> DbResult<()> {
        let affected = self.conn.execute("DELETE FROM projects WHERE name = ?1", params![name])?;
        if affected == 0 {
            return Err(DbError::not_found("Project", name));
        }
        Ok(())
    }

    /// Projects with counts of their owned records.
    pub fn project_summaries(&self) -> DbResult<Vec<ProjectSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT p.id, p.name, p.created_at,
                   (SELECT COUNT(*) FROM files f WHERE f.project_id = p.id),
                   (SELECT COUNT(*) FROM analyses a WHERE a.project_id = p.id),
                   (SELECT COUNT(*) FROM fuzz_stats s WHERE s.project_id = p.id)
            FROM projects p
            ORDER BY p.id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ProjectSummary {
                project: map_project(row)?,
                files: row.get::<_, i64>(3)? as usize,
                analyses: row.get::<_, i64>(4)? as usize,
                fuzz_stats: row.get::<_, i64>(5)? as usize,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Insert a file for a project and return the stored record.
    pub fn insert_file(&self, project_id: i64, file: &NewFile) -> DbResult<FileRecord> {
        self.ensure_project(project_id)?;
        self.conn.execute(
            r#"
            INSERT INTO files (project_id, filename, content)
            VALUES (?1, ?2, ?3)
            "#,
            params![project_id, file.filename, file.content],
        )?;
        Ok(FileRecord {
            id: self.conn.last_insert_rowid(),
            project_id,
            filename: file.filename.clone(),
            content: file.content.clone(),
        })
    }

    /// List all files of a project (ordered by id).
    pub fn list_files(&self, project_id: i64) -> DbResult<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, project_id, filename, content
            FROM files
            WHERE project_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![project_id], map_file)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Fetch one file, scoped to its project.
    pub fn get_file(&self, project_id: i64, file_id: i64) -> DbResult<FileRecord> {
        self.conn
            .query_row(
                r#"
                SELECT id, project_id, filename, content
                FROM files
                WHERE project_id = ?1 AND id = ?2
                "#,
                params![project_id, file_id],
                map_file,
            )
            .optional()?
            .ok_or_else(|| DbError::not_found("File", file_id))
    }

    /// The project's first file (lowest id), if any.
    pub fn first_file(&self, project_id: i64) -> DbResult<Option<FileRecord>> {
        let file = self
            .conn
            .query_row(
                r#"
                SELECT id, project_id, filename, content
                FROM files
                WHERE project_id = ?1
                ORDER BY id
                LIMIT 1
                "#,
                params![project_id],
                map_file,
            )
            .optional()?;
        Ok(file)
    }

    /// Overwrite filename and/or content of a stored file in place.
    pub fn update_file(
        &self,
        project_id: i64,
        file_id: i64,
        update: &FileUpdate,
    ) -> DbResult<FileRecord> {
        let current = self.get_file(project_id, file_id)?;
        let filename = update.filename.clone().unwrap_or(current.filename);
        let content = update.content.clone().unwrap_or(current.content);
        self.conn.execute(
            "UPDATE files SET filename = ?1, content = ?2 WHERE id = ?3",
            params![filename, content, file_id],
        )?;
        Ok(FileRecord { id: file_id, project_id, filename, content })
    }

    /// Store one analysis result.
    pub fn insert_analysis(&self, project_id: i64, result: &str) -> DbResult<AnalysisRecord> {
        self.ensure_project(project_id)?;
        let created_at = Utc::now().to_rfc3339();
        self.conn.execute(
            r#"
            INSERT INTO analyses (project_id, result, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![project_id, result, created_at],
        )?;
        Ok(AnalysisRecord {
            id: self.conn.last_insert_rowid(),
            project_id,
            result: result.to_string(),
            created_at,
        })
    }

    /// List analyses of a project (ordered by id).
    pub fn list_analyses(&self, project_id: i64) -> DbResult<Vec<AnalysisRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, project_id, result, created_at
            FROM analyses
            WHERE project_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(AnalysisRecord {
                id: row.get(0)?,
                project_id: row.get(1)?,
                result: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Persist one fuzz invocation's statistics in a single transaction.
    pub fn insert_fuzz_stats(
        &self,
        project_id: i64,
        stats: &[FuzzStat],
    ) -> DbResult<Vec<FuzzStatRecord>> {
        self.ensure_project(project_id)?;
        let created_at = Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;
        let mut out = Vec::with_capacity(stats.len());
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO fuzz_stats (project_id, variable, iterations, errors, duration, memory_kb, cpu_time, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;
            for stat in stats {
                stmt.execute(params![
                    project_id,
                    stat.variable,
                    stat.iterations as i64,
                    stat.errors as i64,
                    stat.duration,
                    stat.memory_kb,
                    stat.cpu_time,
                    created_at
                ])?;
                out.push(FuzzStatRecord {
                    id: tx.last_insert_rowid(),
                    project_id,
                    stat: stat.clone(),
                    created_at: created_at.clone(),
                });
            }
        }
        tx.commit()?;
        Ok(out)
    }

    /// List fuzz stats of a project (ordered by id).
    pub fn list_fuzz_stats(&self, project_id: i64) -> DbResult<Vec<FuzzStatRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, project_id, variable, iterations, errors, duration, memory_kb, cpu_time, created_at
            FROM fuzz_stats
            WHERE project_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(FuzzStatRecord {
                id: row.get(0)?,
                project_id: row.get(1)?,
                stat: FuzzStat {
                    variable: row.get(2)?,
                    iterations: row.get::<_, i64>(3)? as u32,
                    errors: row.get::<_, i64>(4)? as u32,
                    duration: row.get(5)?,
                    memory_kb: row.get(6)?,
                    cpu_time: row.get(7)?,
                },
                created_at: row.get(8)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn ensure_project(&self, project_id: i64) -> DbResult<()> {
        match self.project_by_id(project_id)? {
            Some(_) => Ok(()),
            None => Err(DbError::not_found("Project", project_id)),
        }
    }
}

/// A name is valid when it is a single, non-empty, non-dot path component.
pub fn is_valid_project_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

fn map_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectRecord> {
    Ok(ProjectRecord { id: row.get(0)?, name: row.get(1)?, created_at: row.get(2)? })
}

fn map_file(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        project_id: row.get(1)?,
        filename: row.get(2)?,
        content: row.get(3)?,
    })
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: initial schema (projects, files, analyses)
/// - 2: add fuzz_stats table
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let mut current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS projects (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS files (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                filename   TEXT NOT NULL,
                content    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS analyses (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                result     TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_files_project ON files(project_id);
            CREATE INDEX IF NOT EXISTS idx_analyses_project ON analyses(project_id);

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
        current_version = 1;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS fuzz_stats (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                variable   TEXT NOT NULL,
                iterations INTEGER NOT NULL,
                errors     INTEGER NOT NULL,
                duration   REAL NOT NULL,
                memory_kb  REAL NOT NULL,
                cpu_time   REAL NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_fuzz_stats_project ON fuzz_stats(project_id);

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
