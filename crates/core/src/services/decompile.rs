use std::path::Path;

/// Pretend to decompile an executable into pseudo C.
///
/// No bytes are read; the output only names the source path.
pub fn decompile_exe(path: &Path) -> String {
    format!("// Decompiled code from {}", path.display())
}
