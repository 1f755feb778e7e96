//! Pipeline configuration.
//!
//! Two settings, per spec.md §6: where scratch workspaces are created, and
//! which executable name to invoke for version control. Loading these from
//! a file or environment is the host application's job (configuration
//! loading is an external collaborator, see spec.md §1).

use std::path::PathBuf;

/// Hard limits enforced across stages (spec.md §4.2-§4.4, §8).
pub mod limits {
    /// Triage fails with `LimitsExceeded` above this many source files.
    pub const MAX_SOURCE_FILES: usize = 100_000;

    /// Project loader safety caps (direct-filesystem loading mode).
    pub const MAX_PROJECTS: usize = 10;
    pub const MAX_DOCUMENTS_PER_PROJECT: usize = 50;

    /// Total decoded source text across all loaded documents, in bytes.
    pub const MAX_TOTAL_SOURCE_BYTES: u64 = 200 * 1024 * 1024;

    /// Parser & resolver fails with `LimitsExceeded` above this many file edges.
    pub const MAX_FILE_EDGES: usize = 150_000;

    /// Wall-clock budget for the workspace fetch stage.
    pub const FETCH_TIMEOUT_SECS: u64 = 120;

    /// Number of entries in `fanInTop` / `fanOutTop`.
    pub const TOP_N: usize = 5;

    /// Member identifiers kept in a cycle's `sample`.
    pub const CYCLE_SAMPLE_SIZE: usize = 5;
}

/// Runtime configuration for a pipeline invocation.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root directory under which scratch workspaces are created.
    pub scratch_root: PathBuf,
    /// Executable name for the version-control subprocess (e.g. `"git"`).
    pub vcs_executable: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scratch_root: std::env::temp_dir(),
            vcs_executable: default_vcs_executable().to_string(),
        }
    }
}

#[cfg(windows)]
fn default_vcs_executable() -> &'static str {
    "git.exe"
}

#[cfg(not(windows))]
fn default_vcs_executable() -> &'static str {
    "git"
}
