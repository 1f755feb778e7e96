//! Metrics stage (spec.md §4.6): per-file LOC, fan-in/fan-out for both
//! graphs, and top-N rankings.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::limits::TOP_N;
use crate::model::{CountsBlock, Graph, NodePayload};
use crate::parser::parse_source;

/// Non-blank, non-comment line count for one document's source text
/// (spec.md §4.6). Uses tree-sitter comment spans for interior lines of
/// multi-line comments, falling back to the trimmed-line heuristic the
/// spec names for everything else (including when parsing fails).
pub fn line_count(source: &str) -> u32 {
    let tree = parse_source(source);
    let mut comment_interior_lines = HashSet::new();
    if let Some(tree) = &tree {
        collect_comment_interior_lines(tree.root_node(), &mut comment_interior_lines);
    }

    let mut loc = 0u32;
    for (row, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if comment_interior_lines.contains(&row) {
            continue;
        }
        if trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
            continue;
        }
        loc += 1;
    }
    loc
}

/// Lines strictly between a multi-line comment's first and last row are
/// fully covered by the comment's span regardless of leading whitespace
/// or a missing `*` continuation marker.
fn collect_comment_interior_lines(node: tree_sitter::Node, lines: &mut HashSet<usize>) {
    if node.kind() == "comment" {
        let start = node.start_position().row;
        let end = node.end_position().row;
        for row in (start + 1)..end {
            lines.insert(row);
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_comment_interior_lines(child, lines);
    }
}

/// Per-file LOC for every document in the working tree (spec.md §4.6).
pub fn file_loc(documents: &[(String, String)]) -> HashMap<String, u32> {
    documents
        .iter()
        .map(|(path, text)| (path.clone(), line_count(text)))
        .collect()
}

/// Namespace LOC = sum of LOC over every file mapped to that namespace.
pub fn namespace_loc(file_loc: &HashMap<String, u32>, file_namespace: &HashMap<String, String>) -> HashMap<String, u32> {
    let mut totals: HashMap<String, u32> = HashMap::new();
    for (path, loc) in file_loc {
        let namespace = file_namespace
            .get(path)
            .cloned()
            .unwrap_or_else(|| "<global>".to_string());
        *totals.entry(namespace).or_insert(0) += loc;
    }
    totals
}

fn file_node_payload(path: &str, graph: &Graph, loc: u32) -> NodePayload {
    let id = format!("File:{path}");
    let label = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string();
    NodePayload {
        fan_in: graph.fan_in(&id),
        fan_out: graph.fan_out(&id),
        id,
        label,
        loc,
    }
}

fn namespace_node_payload(fqn: &str, graph: &Graph, loc: u32) -> NodePayload {
    let id = format!("Namespace:{fqn}");
    let label = if fqn == "<global>" {
        "(global)".to_string()
    } else {
        fqn.rsplit('.').next().unwrap_or(fqn).to_string()
    };
    NodePayload {
        fan_in: graph.fan_in(&id),
        fan_out: graph.fan_out(&id),
        id,
        label,
        loc,
    }
}

/// Node payloads for every file node, in lexicographic id order.
pub fn file_node_payloads(file_graph: &Graph, loc: &HashMap<String, u32>) -> Vec<NodePayload> {
    file_graph
        .nodes_sorted()
        .into_iter()
        .map(|id| {
            let path = id.strip_prefix("File:").unwrap_or(&id);
            file_node_payload(path, file_graph, loc.get(path).copied().unwrap_or(0))
        })
        .collect()
}

/// Node payloads for every namespace node, in lexicographic id order.
pub fn namespace_node_payloads(namespace_graph: &Graph, loc: &HashMap<String, u32>) -> Vec<NodePayload> {
    namespace_graph
        .nodes_sorted()
        .into_iter()
        .map(|id| {
            let fqn = id.strip_prefix("Namespace:").unwrap_or(&id);
            namespace_node_payload(fqn, namespace_graph, loc.get(fqn).copied().unwrap_or(0))
        })
        .collect()
}

/// Top-N by a metric, excluding zero-valued nodes, ties broken by the
/// order `candidates` was given in (spec.md §4.6) — relies on `sort_by`
/// being a stable sort.
fn top_n_by(candidates: &[NodePayload], metric: impl Fn(&NodePayload) -> usize, n: usize) -> Vec<NodePayload> {
    let mut ranked: Vec<&NodePayload> = candidates.iter().filter(|c| metric(c) > 0).collect();
    ranked.sort_by(|a, b| metric(b).cmp(&metric(a)));
    ranked.into_iter().take(n).cloned().collect()
}

pub fn fan_in_top(file_nodes: &[NodePayload], namespace_nodes: &[NodePayload]) -> Vec<NodePayload> {
    let candidates: Vec<NodePayload> = file_nodes.iter().chain(namespace_nodes.iter()).cloned().collect();
    top_n_by(&candidates, |n| n.fan_in, TOP_N)
}

pub fn fan_out_top(file_nodes: &[NodePayload], namespace_nodes: &[NodePayload]) -> Vec<NodePayload> {
    let candidates: Vec<NodePayload> = file_nodes.iter().chain(namespace_nodes.iter()).cloned().collect();
    top_n_by(&candidates, |n| n.fan_out, TOP_N)
}

pub fn counts(file_graph: &Graph, namespace_graph: &Graph) -> CountsBlock {
    CountsBlock {
        namespace_nodes: namespace_graph.node_count(),
        file_nodes: file_graph.node_count(),
        edges: file_graph.edge_count() + namespace_graph.edge_count(),
    }
}
