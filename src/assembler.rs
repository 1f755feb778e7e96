//! Assembler stage (spec.md §4.8): compose the final `AnalysisReport`.

use chrono::Utc;

use crate::metrics;
use crate::model::{
    AnalysisReport, CycleGroup, EdgePayload, Graph, GraphPayload, GraphsPayload, MetricsBlock,
    NodePayload, ReportMeta,
};

pub struct AssemblerInput<'a> {
    pub repo_url: String,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub file_graph: &'a Graph,
    pub namespace_graph: &'a Graph,
    pub file_nodes: Vec<NodePayload>,
    pub namespace_nodes: Vec<NodePayload>,
    pub cycles: Vec<CycleGroup>,
}

/// Compose the final report from every stage's output (spec.md §4.8).
/// Node ordering is lexicographic (already guaranteed by the metrics
/// stage's node payload construction); edge ordering is insertion order.
pub fn assemble(input: AssemblerInput) -> AnalysisReport {
    let file_edges = edge_payloads(input.file_graph);
    let namespace_edges = edge_payloads(input.namespace_graph);

    let fan_in_top = metrics::fan_in_top(&input.file_nodes, &input.namespace_nodes);
    let fan_out_top = metrics::fan_out_top(&input.file_nodes, &input.namespace_nodes);
    let counts = metrics::counts(input.file_graph, input.namespace_graph);

    AnalysisReport {
        meta: ReportMeta {
            repo: input.repo_url,
            branch: input.branch,
            commit: input.commit,
            generated_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        },
        graphs: GraphsPayload {
            namespace: GraphPayload {
                nodes: input.namespace_nodes,
                edges: namespace_edges,
            },
            file: GraphPayload {
                nodes: input.file_nodes,
                edges: file_edges,
            },
        },
        metrics: MetricsBlock {
            counts,
            fan_in_top,
            fan_out_top,
        },
        cycles: input.cycles,
    }
}

fn edge_payloads(graph: &Graph) -> Vec<EdgePayload> {
    graph
        .edges()
        .iter()
        .map(|edge| EdgePayload {
            from: edge.from.clone(),
            to: edge.to.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_a_report_with_deterministic_node_ordering() {
        let mut file_graph = Graph::new();
        file_graph.add_edge("File:b.cs", "File:a.cs");
        let namespace_graph = Graph::new();

        let file_nodes = metrics::file_node_payloads(&file_graph, &Default::default());
        let report = assemble(AssemblerInput {
            repo_url: "https://example.com/r".to_string(),
            branch: None,
            commit: None,
            file_graph: &file_graph,
            namespace_graph: &namespace_graph,
            file_nodes,
            namespace_nodes: Vec::new(),
            cycles: Vec::new(),
        });

        assert_eq!(report.graphs.file.nodes[0].id, "File:a.cs");
        assert_eq!(report.graphs.file.nodes[1].id, "File:b.cs");
        assert_eq!(report.graphs.file.edges.len(), 1);
        assert!(report.meta.generated_at.ends_with('Z'));
    }
}
