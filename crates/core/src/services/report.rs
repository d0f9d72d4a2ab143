use serde::{Deserialize, Serialize};

use crate::services::fuzz::FuzzStat;

/// Everything persisted for one project, shaped for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReport {
    pub project_id: i64,
    pub project: String,
    pub generated_at: String,
    /// File names in upload order.
    pub files: Vec<String>,
    /// Analysis results in creation order.
    pub analyses: Vec<String>,
    pub fuzz_stats: Vec<FuzzStat>,
}

impl ProjectReport {
    /// Total simulated crashes across all fuzz stats.
    pub fn total_errors(&self) -> u64 {
        self.fuzz_stats.iter().map(|s| s.errors as u64).sum()
    }

    /// Render the report as a Markdown document.
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Project report: {}\n\n", self.project));
        out.push_str(&format!("- Project id: {}\n", self.project_id));
        out.push_str(&format!("- Generated at: {}\n\n", self.generated_at));

        out.push_str(&format!("## Files ({})\n", self.files.len()));
        if self.files.is_empty() {
            out.push_str("- (none)\n");
        }
        for name in &self.files {
            out.push_str(&format!("- {name}\n"));
        }
        out.push('\n');

        out.push_str(&format!("## Analyses ({})\n", self.analyses.len()));
        if self.analyses.is_empty() {
            out.push_str("- (none)\n");
        }
        for (idx, result) in self.analyses.iter().enumerate() {
            out.push_str(&format!("### Analysis {}\n\n{}\n\n", idx + 1, result.trim_end()));
        }
        out.push('\n');

        out.push_str(&format!(
            "## Fuzz stats ({}, {} errors)\n",
            self.fuzz_stats.len(),
            self.total_errors()
        ));
        if self.fuzz_stats.is_empty() {
            out.push_str("- (none)\n");
            return out;
        }
        out.push_str("| variable | iterations | errors | duration (s) | memory (KB) | cpu time (s) |\n");
        out.push_str("|---|---|---|---|---|---|\n");
        for s in &self.fuzz_stats {
            out.push_str(&format!(
                "| {} | {} | {} | {:.6} | {:.1} | {:.6} |\n",
                escape_cell(&s.variable),
                s.iterations,
                s.errors,
                s.duration,
                s.memory_kb,
                s.cpu_time
            ));
        }
        out
    }
}

/// Table cells cannot contain a raw `|`.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(stats: Vec<FuzzStat>) -> ProjectReport {
        ProjectReport {
            project_id: 1,
            project: "demo".into(),
            generated_at: "2024-01-01T00:00:00+00:00".into(),
            files: vec!["demo.c".into()],
            analyses: vec!["No vulnerabilities found".into()],
            fuzz_stats: stats,
        }
    }

    #[test]
    fn markdown_includes_table_rows() {
        let md = report(vec![FuzzStat {
            variable: "var1".into(),
            iterations: 100,
            errors: 2,
            duration: 0.001,
            memory_kb: 0.0,
            cpu_time: 0.0,
        }])
        .render_markdown();
        assert!(md.starts_with("# Project report: demo"));
        assert!(md.contains("- demo.c"));
        assert!(md.contains("No vulnerabilities found"));
        assert!(md.contains("| var1 | 100 | 2 |"));
        assert!(md.contains("## Fuzz stats (1, 2 errors)"));
    }

    #[test]
    fn pipes_in_variable_names_are_escaped() {
        let md = report(vec![FuzzStat {
            variable: "var|x".into(),
            iterations: 1,
            errors: 0,
            duration: 0.0,
            memory_kb: 0.0,
            cpu_time: 0.0,
        }])
        .render_markdown();
        assert!(md.contains("| var\\|x | 1 | 0 |"));
    }

    #[test]
    fn markdown_marks_empty_stats() {
        let md = report(vec![]).render_markdown();
        assert!(md.contains("## Fuzz stats (0, 0 errors)\n- (none)"));
    }
}
