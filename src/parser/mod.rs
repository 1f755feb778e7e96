//! Parser & resolver stage (spec.md §4.4) — the algorithmic core of the
//! pipeline: parse every accepted document, build a per-project symbol
//! table, and resolve cross-file identifier references into file→file
//! edges.

mod frontend;
mod resolver;
mod symbols;

pub use frontend::parse_source;
pub use resolver::{detect_missing_sdk, CompilationUnit, ParseOutcome, MISSING_SDK_MARKERS};
pub use symbols::SymbolTable;

use rayon::prelude::*;

use crate::config::limits;
use crate::errors::CodeAtlasError;
use crate::loader::LoadedProject;
use crate::model::Graph;

/// Worker count for this stage's fan-out: one worker per project, never
/// more than the machine's CPU count and never more than
/// [`limits::MAX_PROJECTS`] (the loader already caps project count, so
/// this mostly just avoids spinning up a pool wider than the workload).
fn worker_count(project_count: usize) -> usize {
    project_count.clamp(1, num_cpus::get())
}

/// Pure boundary check for the file-edge cap (spec.md §4.4, §8's
/// boundary-behavior requirement), split out so the exact threshold can be
/// unit-tested without constructing a 150,000-edge graph.
fn check_edge_count(count: usize) -> Result<(), CodeAtlasError> {
    if count > limits::MAX_FILE_EDGES {
        Err(CodeAtlasError::LimitsExceeded {
            message: format!("{count} file edges exceeds the {} edge cap", limits::MAX_FILE_EDGES),
        })
    } else {
        Ok(())
    }
}

/// Parse every loaded project and resolve cross-file references, merging
/// each project's contribution into one global file graph (spec.md §4.4).
///
/// Projects are parsed on a dedicated `rayon` pool sized to the workload
/// (spec.md §5's "parser stage may process projects ... in parallel");
/// results are merged back in the caller-supplied project order so the
/// resulting edge list stays deterministic regardless of which worker
/// finishes first.
pub fn parse_and_resolve(projects: &[LoadedProject]) -> Result<ParseOutcome, CodeAtlasError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count(projects.len()))
        .build()
        .map_err(|err| CodeAtlasError::Internal(format!("failed to build parser thread pool: {err}")))?;

    let per_project: Vec<resolver::ProjectOutcome> =
        pool.install(|| projects.par_iter().map(resolver::resolve_project).collect());

    let mut file_graph = Graph::new();
    let mut units = Vec::new();
    let mut any_compiled = false;

    for outcome in per_project {
        any_compiled |= outcome.unit.compiled;
        for edge in outcome.edges {
            file_graph.add_edge(edge.0, edge.1);
        }
        units.push(outcome.unit);
    }

    if !any_compiled {
        return Err(CodeAtlasError::BuildFailed {
            remediation:
                "every project failed to produce a syntax tree; verify the checked-out sources \
                 are complete and parse as C#"
                    .to_string(),
        });
    }

    check_edge_count(file_graph.edge_count())?;

    Ok(ParseOutcome {
        file_graph,
        units,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_never_exceeds_cpu_count_or_drops_below_one() {
        assert_eq!(worker_count(0), 1);
        assert!(worker_count(1000) <= num_cpus::get());
    }

    #[test]
    fn edge_count_boundary_is_inclusive_at_the_cap() {
        assert!(check_edge_count(limits::MAX_FILE_EDGES).is_ok());
        assert!(check_edge_count(limits::MAX_FILE_EDGES + 1).is_err());
    }
}
