//! Mock security review of stored code.
//!
//! The verdict comes from the text-generation collaborator when it answers;
//! otherwise a fixed "no findings" string is returned.

use log::debug;

use crate::services::generator::TextGenerator;

/// Verdict returned whenever the collaborator cannot produce a review.
pub const NO_FINDINGS: &str = "No vulnerabilities found";

/// Review request handed to the collaborator.
pub fn analysis_prompt(code: &str, notes: Option<&str>) -> String {
    format!(
        "Review the following C function for security issues. User notes: {}\n{}\n",
        notes.unwrap_or(""),
        code
    )
}

/// Mock security review of `code`.
///
/// Returns the collaborator's answer verbatim when it is non-blank and
/// [`NO_FINDINGS`] otherwise. Never fails.
pub fn analyze_code(
    code: &str,
    notes: Option<&str>,
    generator: &dyn TextGenerator,
    max_tokens: usize,
) -> String {
    match generator.generate(&analysis_prompt(code, notes), max_tokens) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            debug!("generator {} returned an empty review", generator.name());
            NO_FINDINGS.to_string()
        }
        Err(err) => {
            debug!("analysis fell back to default verdict: {err}");
            NO_FINDINGS.to_string()
        }
    }
}
