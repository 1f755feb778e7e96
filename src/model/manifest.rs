//! Project/solution manifests (spec.md §3, §4.2, §4.3).

use std::path::PathBuf;

/// Pointer to a project description file and the directory it governs.
#[derive(Debug, Clone)]
pub struct ProjectManifest {
    /// Absolute path to the `.csproj` (or equivalent) file.
    pub manifest_path: PathBuf,
    /// Directory the manifest governs (its parent, normally).
    pub project_dir: PathBuf,
    /// Name derived from the manifest's file stem.
    pub name: String,
    /// Declared/inferred language tag, e.g. `"csharp"`.
    pub language: String,
    /// Inferred target platform tag (e.g. `net8.0`), used in `MissingSdk` reports.
    pub target_platform: Option<String>,
    /// True when the test-project or non-C#-style-project filter excludes it.
    pub excluded: bool,
}

impl ProjectManifest {
    pub fn new(manifest_path: PathBuf, language: impl Into<String>) -> Self {
        let project_dir = manifest_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let name = manifest_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        Self {
            manifest_path,
            project_dir,
            name,
            language: language.into(),
            target_platform: None,
            excluded: false,
        }
    }
}

/// Result of triage's manifest search (spec.md §4.2).
#[derive(Debug, Clone)]
pub enum ManifestSelection {
    /// A single solution file selected by the search order.
    Solution(PathBuf),
    /// An unordered set of project manifests (no solution file found).
    Projects(Vec<PathBuf>),
}
