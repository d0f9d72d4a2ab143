//! Stub generation: neutralize every identifier that is not a fuzz target.

use std::collections::BTreeSet;

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::services::generator::TextGenerator;

/// Replacement text for a stubbed identifier.
pub const STUB_PLACEHOLDER: &str = "0 /* stub */";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("identifier pattern is valid"));

/// Output of stub generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StubOutcome {
    /// Stubbed code (collaborator output when it produced some).
    pub code: String,
    /// Sorted, distinct identifiers that were replaced.
    pub stubbed: Vec<String>,
}

/// Every distinct whole-word identifier in `code`, sorted.
pub fn identifiers(code: &str) -> BTreeSet<String> {
    IDENTIFIER.find_iter(code).map(|m| m.as_str().to_string()).collect()
}

/// Replace non-target identifiers with [`STUB_PLACEHOLDER`], locally only.
///
/// Replacement happens in one pass over the identifier matches, so inserted
/// placeholders are never rewritten and identifiers that merely contain a
/// stubbed name are left alone.
pub fn stub_locally(code: &str, targets: &[String]) -> StubOutcome {
    let stubbed: Vec<String> = identifiers(code)
        .into_iter()
        .filter(|ident| !targets.iter().any(|t| t == ident))
        .collect();

    let replaced = IDENTIFIER.replace_all(code, |caps: &Captures<'_>| {
        let ident = &caps[0];
        if stubbed.binary_search_by(|s| s.as_str().cmp(ident)).is_ok() {
            STUB_PLACEHOLDER.to_string()
        } else {
            ident.to_string()
        }
    });

    StubOutcome { code: replaced.into_owned(), stubbed }
}

/// Instruction sent to the collaborator for a stub rewrite.
pub fn stub_prompt(code: &str, targets: &[String]) -> String {
    format!(
        "Replace all variables except {} with neutral stubs in the following C code:\n{}\n",
        targets.join(", "),
        code
    )
}

/// Stub `code`, keeping `targets` intact.
///
/// The collaborator gets a chance to produce nicer stubbed code; a non-blank
/// answer replaces the local text. Any collaborator failure leaves the local
/// result untouched. The stubbed identifier list is always the local one.
pub fn generate_stubs(
    code: &str,
    targets: &[String],
    generator: &dyn TextGenerator,
    max_tokens: usize,
) -> StubOutcome {
    let mut outcome = stub_locally(code, targets);

    match generator.generate(&stub_prompt(code, targets), max_tokens) {
        Ok(text) if !text.trim().is_empty() => {
            debug!("using stub rewrite from generator {}", generator.name());
            outcome.code = text;
        }
        Ok(_) => debug!("generator {} returned no stub text; keeping local stubs", generator.name()),
        Err(err) => debug!("stub generation fell back to local stubs: {err}"),
    }

    outcome
}
