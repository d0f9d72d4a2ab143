//! Naive fuzz-target selection.

/// Literal prefix marking a token as a fuzz target.
pub const TARGET_PREFIX: &str = "var";

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Choose fuzz targets: whitespace-separated tokens starting with `var`.
///
/// Trailing punctuation glued to a token (`var2;`, `var1)`) is trimmed first;
/// the token must still begin with the prefix in the source text. The
/// result holds distinct tokens in first-appearance order. This is a surface
/// heuristic; comments and string literals are not recognized.
pub fn select_target_variables(code: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in code.split_whitespace() {
        let token = raw.trim_end_matches(|c: char| !is_ident_char(c));
        if token.starts_with(TARGET_PREFIX) && !out.iter().any(|t| t == token) {
            out.push(token.to_string());
        }
    }
    out
}
