//! AnalysisReport and its nested serializable shapes (spec.md §3, §6).

use serde::Serialize;

/// The final artifact produced by the assembler stage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub meta: ReportMeta,
    pub graphs: GraphsPayload,
    pub metrics: MetricsBlock,
    pub cycles: Vec<CycleGroup>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub repo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// UTC, fixed ISO-8601 profile (RFC 3339 with `Z` suffix).
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphsPayload {
    pub namespace: GraphPayload,
    pub file: GraphPayload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    pub nodes: Vec<NodePayload>,
    pub edges: Vec<EdgePayload>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePayload {
    pub id: String,
    pub label: String,
    pub loc: u32,
    pub fan_in: usize,
    pub fan_out: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgePayload {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBlock {
    pub counts: CountsBlock,
    pub fan_in_top: Vec<NodePayload>,
    pub fan_out_top: Vec<NodePayload>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountsBlock {
    pub namespace_nodes: usize,
    pub file_nodes: usize,
    pub edges: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleGroup {
    pub id: u32,
    pub size: usize,
    pub sample: Vec<String>,
}
