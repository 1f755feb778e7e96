//! Shared data model (spec.md §3).
//!
//! Every pipeline stage reads and writes these types; ownership is scoped
//! to a single request (see `crate::pipeline::analyze_with_cancellation`).

mod document;
mod graph;
mod manifest;
mod report;
mod symbol;
mod workspace;

pub use document::SourceDocument;
pub use graph::{DirectedEdge, Graph, NamespaceId, NodeId};
pub use manifest::{ManifestSelection, ProjectManifest};
pub use report::{
    AnalysisReport, CountsBlock, CycleGroup, EdgePayload, GraphPayload, GraphsPayload,
    MetricsBlock, NodePayload, ReportMeta,
};
pub use symbol::{Symbol, SymbolId, SymbolKind, SymbolLocation};
pub use workspace::Workspace;
