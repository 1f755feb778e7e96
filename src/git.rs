//! Version-control subprocess execution (spec.md §4.1, §6).
//!
//! A thin wrapper around the configured VCS executable, in the same shape
//! as the codebase's existing git-history executor: own the repository
//! path (or, before clone, the destination path), run arguments, map
//! non-zero exit to a typed outcome.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use crate::errors::{CloneFailureReason, CodeAtlasError};

pub struct GitExecutor {
    executable: String,
}

/// Outcome of a clone attempt that completed (possibly with a non-zero
/// status covered by the partial-success rule).
pub struct CloneOutcome {
    pub succeeded: bool,
    pub stderr: String,
}

impl GitExecutor {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Shallow, single-branch, no-tags clone into `dest` (spec.md §4.1).
    /// `dest`'s parent must exist; `dest` itself must not.
    pub fn clone_shallow(
        &self,
        url: &str,
        branch: Option<&str>,
        dest: &Path,
        timeout: Duration,
    ) -> Result<CloneOutcome, CodeAtlasError> {
        let url = normalize_url(url);

        let mut command = Command::new(&self.executable);
        command
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg("--single-branch")
            .arg("--no-tags")
            .arg("-c")
            .arg("core.longpaths=true");
        if let Some(branch) = branch {
            command.arg("--branch").arg(branch);
        }
        command.arg(&url).arg(dest);

        let output = run_with_deadline(command, timeout)?;
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            return Ok(CloneOutcome {
                succeeded: true,
                stderr,
            });
        }

        if is_long_path_only_failure(&stderr) {
            return Ok(CloneOutcome {
                succeeded: true,
                stderr,
            });
        }

        Err(CodeAtlasError::CloneFailed {
            reason: classify_failure(&stderr),
        })
    }

    /// Resolve `HEAD` to its full commit id. A failure here is non-fatal
    /// per spec.md §4.1 — callers should treat `None` as "field absent".
    pub fn resolve_head(&self, repo_dir: &Path) -> Option<String> {
        let output = Command::new(&self.executable)
            .args(["rev-parse", "HEAD"])
            .current_dir(repo_dir)
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let commit = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if commit.is_empty() {
            None
        } else {
            Some(commit)
        }
    }
}

/// Run `command`, polling for completion, and kill+timeout if `deadline`
/// elapses before the subprocess exits. `std::process` has no built-in
/// wait-with-timeout, so this polls `try_wait` the way a sequential,
/// non-async pipeline is expected to (spec.md §5).
fn run_with_deadline(
    mut command: Command,
    deadline: Duration,
) -> Result<Output, CodeAtlasError> {
    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| CodeAtlasError::Internal(format!("failed to spawn vcs process: {err}")))?;

    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(_status)) => {
                return child.wait_with_output().map_err(|err| {
                    CodeAtlasError::Internal(format!("failed to read vcs output: {err}"))
                });
            }
            Ok(None) => {
                if start.elapsed() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(CodeAtlasError::Timeout {
                        elapsed_secs: start.elapsed().as_secs(),
                        budget_secs: deadline.as_secs(),
                    });
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(err) => {
                return Err(CodeAtlasError::Internal(format!(
                    "failed to poll vcs process: {err}"
                )));
            }
        }
    }
}

/// If the URL has no recognized transport scheme or scp-like syntax,
/// prepend `https://` (spec.md §4.1).
pub fn normalize_url(url: &str) -> String {
    const SCHEMES: [&str; 4] = ["http://", "https://", "git://", "ssh://"];
    if SCHEMES.iter().any(|s| url.starts_with(s)) || is_scp_like(url) {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// `user@host:path` syntax, as accepted by git itself.
fn is_scp_like(url: &str) -> bool {
    let Some(at) = url.find('@') else {
        return false;
    };
    let Some(colon) = url[at..].find(':') else {
        return false;
    };
    let colon = at + colon;
    // The colon must come before any path separator for this to be the
    // scp shorthand rather than e.g. a bare `user@host/path`.
    !url[..at].is_empty() && !url[at + 1..colon].is_empty() && !url[at..colon].contains('/')
}

/// True if stderr indicates the *only* problem was a long-path checkout
/// failure on an otherwise-successful fetch (spec.md §4.1 partial success).
fn is_long_path_only_failure(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    let mentions_long_path = lower.contains("filename too long")
        || lower.contains("unable to create file")
        || lower.contains("path too long");
    let mentions_fetch_failure = lower.contains("could not resolve host")
        || lower.contains("repository not found")
        || lower.contains("authentication failed")
        || lower.contains("permission denied")
        || lower.contains("could not read from remote repository");
    mentions_long_path && !mentions_fetch_failure
}

fn classify_failure(stderr: &str) -> CloneFailureReason {
    let lower = stderr.to_lowercase();
    if lower.contains("repository not found") || lower.contains("does not exist") {
        CloneFailureReason::NotFound
    } else if lower.contains("permission denied") || lower.contains("authentication failed") {
        CloneFailureReason::PermissionDenied
    } else if lower.contains("timed out") || lower.contains("timeout") {
        CloneFailureReason::Timeout
    } else if lower.contains("could not resolve host")
        || lower.contains("network is unreachable")
        || lower.contains("could not read from remote repository")
    {
        CloneFailureReason::NetworkFailure
    } else {
        CloneFailureReason::Other
    }
}

/// Build a unique scratch directory path under `scratch_root`.
pub fn unique_scratch_dir(scratch_root: &Path) -> PathBuf {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let token: String = (0..8)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();
    scratch_root.join(format!("codeatlas-{token}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_url_prepends_https_when_scheme_missing() {
        assert_eq!(
            normalize_url("github.com/foo/bar"),
            "https://github.com/foo/bar"
        );
    }

    #[test]
    fn normalize_url_preserves_known_schemes() {
        assert_eq!(normalize_url("https://github.com/foo/bar"), "https://github.com/foo/bar");
        assert_eq!(normalize_url("git://github.com/foo/bar"), "git://github.com/foo/bar");
        assert_eq!(normalize_url("ssh://git@github.com/foo/bar"), "ssh://git@github.com/foo/bar");
    }

    #[test]
    fn normalize_url_preserves_scp_syntax() {
        assert_eq!(
            normalize_url("git@github.com:foo/bar.git"),
            "git@github.com:foo/bar.git"
        );
    }

    #[test]
    fn classify_failure_maps_common_messages() {
        assert_eq!(
            classify_failure("remote: Repository not found."),
            CloneFailureReason::NotFound
        );
        assert_eq!(
            classify_failure("fatal: could not read Username: Authentication failed"),
            CloneFailureReason::PermissionDenied
        );
        assert_eq!(
            classify_failure("fatal: unable to access: Could not resolve host: github.com"),
            CloneFailureReason::NetworkFailure
        );
        assert_eq!(classify_failure("fatal: something else"), CloneFailureReason::Other);
    }

    #[test]
    fn long_path_only_failure_is_detected() {
        assert!(is_long_path_only_failure(
            "error: unable to create file src/very/long/path: Filename too long"
        ));
        assert!(!is_long_path_only_failure(
            "fatal: could not read from remote repository."
        ));
    }

    #[test]
    fn unique_scratch_dir_has_fixed_prefix_and_token_length() {
        let dir = unique_scratch_dir(Path::new("/tmp"));
        let name = dir.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("codeatlas-"));
        assert_eq!(name.len(), "codeatlas-".len() + 8);
    }
}
