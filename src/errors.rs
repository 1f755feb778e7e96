//! Error taxonomy for the CodeAtlas pipeline.
//!
//! One categorized error type covering every stage (§7 of the design doc).
//! Each variant carries whatever context its HTTP-facing consumer needs to
//! build the error body described by the external interface, without this
//! crate depending on an HTTP stack itself.

use thiserror::Error;

/// Errors that can terminate an analysis request.
///
/// Every variant is terminal: no stage recovers from one of these by
/// itself, it short-circuits the pipeline and workspace release still runs.
#[derive(Debug, Error)]
pub enum CodeAtlasError {
    #[error("failed to clone repository: {reason}")]
    CloneFailed { reason: CloneFailureReason },

    #[error("analysis timed out after {elapsed_secs}s (budget {budget_secs}s)")]
    Timeout { elapsed_secs: u64, budget_secs: u64 },

    #[error("no solution or project manifest found")]
    NoSolutionOrProject {
        detected_languages: Vec<String>,
        found_files: Vec<String>,
    },

    #[error("limits exceeded: {message}")]
    LimitsExceeded { message: String },

    #[error("no suitable projects after filtering")]
    NoSuitableProjects,

    #[error("missing SDK/framework reference for target {target_platform}")]
    MissingSdk { target_platform: String },

    #[error("every project failed to produce a compilation: {remediation}")]
    BuildFailed { remediation: String },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Sub-classification of a clone failure, used to pick a user-facing reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneFailureReason {
    NotFound,
    PermissionDenied,
    Timeout,
    NetworkFailure,
    Other,
}

impl std::fmt::Display for CloneFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CloneFailureReason::NotFound => "not-found",
            CloneFailureReason::PermissionDenied => "permission-denied",
            CloneFailureReason::Timeout => "timeout",
            CloneFailureReason::NetworkFailure => "network-failure",
            CloneFailureReason::Other => "other",
        };
        f.write_str(s)
    }
}

impl CodeAtlasError {
    /// Stable machine-readable code, matching spec.md's error body `code` field.
    pub fn code(&self) -> &'static str {
        match self {
            CodeAtlasError::CloneFailed { .. } => "CloneFailed",
            CodeAtlasError::Timeout { .. } => "Timeout",
            CodeAtlasError::NoSolutionOrProject { .. } => "NoSolutionOrProject",
            CodeAtlasError::LimitsExceeded { .. } => "LimitsExceeded",
            CodeAtlasError::NoSuitableProjects => "NoSuitableProjects",
            CodeAtlasError::MissingSdk { .. } => "MissingSdk",
            CodeAtlasError::BuildFailed { .. } => "BuildFailed",
            CodeAtlasError::Internal(_) => "InternalError",
        }
    }
}

pub type Result<T> = std::result::Result<T, CodeAtlasError>;

impl From<std::io::Error> for CodeAtlasError {
    fn from(err: std::io::Error) -> Self {
        CodeAtlasError::Internal(format!("io error: {err}"))
    }
}
