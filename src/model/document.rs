//! SourceDocument (spec.md §3): a file accepted for analysis.

use std::path::PathBuf;

/// A file accepted for analysis.
///
/// Invariant: no two documents in a loaded project set share a
/// repository-relative path.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Absolute filesystem path.
    pub absolute_path: PathBuf,
    /// Repository-relative path, forward-slash separated (the canonical key).
    pub relative_path: String,
    /// Name of the owning project (`ProjectManifest::name`).
    pub project: String,
    /// True if matched by the generated-file rule (excluded upstream; kept
    /// here only for documents constructed before filtering for diagnostics).
    pub generated: bool,
    /// Decoded UTF-8 source text.
    pub text: String,
}

impl SourceDocument {
    /// Build the repository-relative, forward-slash path for a file under
    /// `repo_root`.
    pub fn relative_path_of(repo_root: &std::path::Path, absolute: &std::path::Path) -> String {
        let rel = absolute.strip_prefix(repo_root).unwrap_or(absolute);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}
