//! Aggregator stage (spec.md §4.5): lift file edges to the namespace
//! graph using each file's primary namespace.

use std::collections::HashMap;

use crate::model::Graph;
use crate::parser::CompilationUnit;

/// Build the `document -> namespace` map across every compilation unit.
/// Files with no declared namespace map to `<global>` (stamped by the
/// parser stage; see `parser::resolver::primary_namespace_of`).
pub fn namespace_map(units: &[CompilationUnit]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for unit in units {
        for (path, namespace) in &unit.primary_namespace {
            map.insert(path.clone(), namespace.clone());
        }
    }
    map
}

/// Lift every file edge `(F1, F2)` to a namespace edge `(ns(F1), ns(F2))`
/// (spec.md §4.5). Self-loops are kept, per the spec's (tautological, and
/// intentionally so — see SPEC_FULL.md's Open Questions) lifting rule.
pub fn build_namespace_graph(file_graph: &Graph, namespaces: &HashMap<String, String>) -> Graph {
    let mut namespace_graph = Graph::new();
    for edge in file_graph.edges() {
        let from_ns = namespace_of(&edge.from, namespaces);
        let to_ns = namespace_of(&edge.to, namespaces);
        namespace_graph.add_edge(
            format!("Namespace:{from_ns}"),
            format!("Namespace:{to_ns}"),
        );
    }
    namespace_graph
}

fn namespace_of(file_node_id: &str, namespaces: &HashMap<String, String>) -> String {
    let relative_path = file_node_id.strip_prefix("File:").unwrap_or(file_node_id);
    namespaces
        .get(relative_path)
        .cloned()
        .unwrap_or_else(|| "<global>".to_string())
}
