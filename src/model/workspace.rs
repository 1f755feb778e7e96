//! Workspace: an exclusive scratch checkout for one analysis request
//! (spec.md §3, §4.1).

use std::path::{Path, PathBuf};

/// An isolated temporary directory holding a checked-out working tree.
///
/// Lifetime is one analysis request. `root` is unique per request: the
/// directory name is a fixed prefix plus an 8-character random token, so
/// no two concurrent requests collide.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    /// Resolved `HEAD` commit, if the workspace stage could read it.
    pub commit: Option<String>,
}

impl Workspace {
    /// Build a workspace handle over an already-prepared directory. Used
    /// by the fetch stage after checkout, and directly by tests that seed
    /// a fixture tree without going through the network fetch.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            commit: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn with_commit(mut self, commit: Option<String>) -> Self {
        self.commit = commit;
        self
    }

    /// Delete the workspace directory, including read-only VCS metadata.
    /// Idempotent: a missing directory is not an error, and any removal
    /// failure is swallowed — release must never fail the request.
    pub fn release(&self) {
        if let Err(err) = remove_dir_all_writable(&self.root) {
            tracing::warn!(path = %self.root.display(), error = %err, "workspace release failed");
        }
    }
}

#[cfg(unix)]
fn clear_readonly(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(windows)]
fn clear_readonly(path: &Path) -> std::io::Result<()> {
    for entry in walkdir::WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
        let metadata = entry.metadata()?;
        let mut perms = metadata.permissions();
        if perms.readonly() {
            perms.set_readonly(false);
            std::fs::set_permissions(entry.path(), perms)?;
        }
    }
    Ok(())
}

fn remove_dir_all_writable(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    clear_readonly(path)?;
    std::fs::remove_dir_all(path)
}
