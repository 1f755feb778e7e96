//! Pipeline orchestration (spec.md §2, §4.8's state machine): the single
//! entry point a transport layer calls, chaining every stage and
//! guaranteeing workspace release on every exit path (spec.md §7).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::aggregator;
use crate::assembler::{self, AssemblerInput};
use crate::config::{limits, PipelineConfig};
use crate::cycles;
use crate::errors::CodeAtlasError;
use crate::git::{unique_scratch_dir, GitExecutor};
use crate::loader;
use crate::metrics;
use crate::model::{AnalysisReport, Workspace};
use crate::parser;
use crate::triage;

/// Mirrors `POST /analyze`'s request body (spec.md §6).
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub repo_url: String,
    pub branch: Option<String>,
}

/// Cooperative cancellation, checked between stages and (inside the
/// parser stage) between projects/documents (spec.md §5).
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), CodeAtlasError> {
        if self.is_cancelled() {
            Err(CodeAtlasError::Internal("request cancelled".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Single entry point a transport layer calls (spec.md §6, SPEC_FULL.md §6).
pub fn analyze(
    request: AnalysisRequest,
    config: &PipelineConfig,
) -> Result<AnalysisReport, CodeAtlasError> {
    analyze_with_cancellation(request, config, &CancellationToken::new())
}

/// Same as [`analyze`], but honoring an externally-held cancellation
/// token (spec.md §5's cancellation-at-every-suspension-point rule).
pub fn analyze_with_cancellation(
    request: AnalysisRequest,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> Result<AnalysisReport, CodeAtlasError> {
    // A per-request correlation id, threaded through every stage's tracing
    // span so logs from one request can be told apart from a concurrent
    // one sharing the same process (spec.md §5: nothing is shared between
    // requests, but the logging sink is).
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("analyze", request_id = %request_id, repo = %request.repo_url);
    let _guard = span.enter();

    let workspace = acquire_workspace(&request, config)?;
    let result = run_stages(&request, &workspace, cancel);
    // Release runs on every exit path, success or failure, and never fails
    // the request itself (spec.md §4.1, §7).
    workspace.release();
    result
}

fn acquire_workspace(
    request: &AnalysisRequest,
    config: &PipelineConfig,
) -> Result<Workspace, CodeAtlasError> {
    std::fs::create_dir_all(&config.scratch_root)?;
    let dest = unique_scratch_dir(&config.scratch_root);
    let executor = GitExecutor::new(config.vcs_executable.clone());
    let timeout = Duration::from_secs(limits::FETCH_TIMEOUT_SECS);

    executor.clone_shallow(&request.repo_url, request.branch.as_deref(), &dest, timeout)?;
    let commit = executor.resolve_head(&dest);
    Ok(Workspace::at(dest).with_commit(commit))
}

fn run_stages(
    request: &AnalysisRequest,
    workspace: &Workspace,
    cancel: &CancellationToken,
) -> Result<AnalysisReport, CodeAtlasError> {
    cancel.check()?;
    let selection = triage::triage(workspace.root())?;
    tracing::debug!("triage complete");

    cancel.check()?;
    let projects = loader::load_projects(workspace.root(), &selection)?;
    tracing::debug!(project_count = projects.len(), "projects loaded");

    cancel.check()?;
    let parse_outcome = parser::parse_and_resolve(&projects)?;
    tracing::debug!(
        file_edges = parse_outcome.file_graph.edge_count(),
        "parser & resolver complete"
    );

    cancel.check()?;
    let namespaces = aggregator::namespace_map(&parse_outcome.units);
    let namespace_graph = aggregator::build_namespace_graph(&parse_outcome.file_graph, &namespaces);

    cancel.check()?;
    let document_texts: Vec<(String, String)> = projects
        .iter()
        .flat_map(|p| p.documents.iter().map(|d| (d.relative_path.clone(), d.text.clone())))
        .collect();
    let loc_by_file = metrics::file_loc(&document_texts);
    let loc_by_namespace = metrics::namespace_loc(&loc_by_file, &namespaces);

    // Metrics and Cycles read disjoint inputs and may run concurrently
    // (spec.md §5); node-payload construction and SCC discovery don't
    // share mutable state, so this is a plain scoped thread fan-out
    // rather than a rayon pool.
    let (file_nodes, namespace_nodes, cycle_groups) = std::thread::scope(|scope| {
        let cycles_handle = scope.spawn(|| cycles::detect_cycles(&parse_outcome.file_graph));
        let file_nodes = metrics::file_node_payloads(&parse_outcome.file_graph, &loc_by_file);
        let namespace_nodes = metrics::namespace_node_payloads(&namespace_graph, &loc_by_namespace);
        let cycle_groups = cycles_handle.join().unwrap_or_default();
        (file_nodes, namespace_nodes, cycle_groups)
    });

    cancel.check()?;
    Ok(assembler::assemble(AssemblerInput {
        repo_url: request.repo_url.clone(),
        branch: request.branch.clone(),
        commit: workspace.commit.clone(),
        file_graph: &parse_outcome.file_graph,
        namespace_graph: &namespace_graph,
        file_nodes,
        namespace_nodes,
        cycles: cycle_groups,
    }))
}

/// Run the pipeline over an already-prepared workspace, skipping the
/// fetch step entirely. Used by integration tests that seed a fixture
/// tree and by any caller that manages its own checkout (spec.md §9's
/// "build a workspace, run the pipeline over fixtures" test shape).
pub fn analyze_workspace(
    request: AnalysisRequest,
    workspace: &Workspace,
) -> Result<AnalysisReport, CodeAtlasError> {
    run_stages(&request, workspace, &CancellationToken::new())
}
