//! Cycles stage (spec.md §4.7): strongly connected components of the
//! file graph, filtered to size >= 2, in deterministic discovery order.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::config::limits::CYCLE_SAMPLE_SIZE;
use crate::model::{CycleGroup, Graph};

/// Detect cyclic dependency groups in `file_graph` (spec.md §4.7).
///
/// Nodes are fed to `petgraph` in lexicographic order so that `tarjan_scc`
/// — itself iterative, avoiding the recursion-depth concern spec.md §9
/// flags — produces a deterministic discovery order across runs on
/// identical inputs (spec.md §5(c)).
pub fn detect_cycles(file_graph: &Graph) -> Vec<CycleGroup> {
    let sorted_nodes = file_graph.nodes_sorted();
    let mut graph = DiGraph::<String, ()>::new();
    let mut index_of: HashMap<String, NodeIndex> = HashMap::new();

    for id in &sorted_nodes {
        let idx = graph.add_node(id.clone());
        index_of.insert(id.clone(), idx);
    }
    for edge in file_graph.edges() {
        if let (Some(&from), Some(&to)) = (index_of.get(&edge.from), index_of.get(&edge.to)) {
            graph.add_edge(from, to, ());
        }
    }

    let components = tarjan_scc(&graph);

    let mut cycles = Vec::new();
    let mut next_id = 1u32;
    for component in components {
        if component.len() < 2 {
            continue;
        }
        let mut members: Vec<String> = component.iter().map(|&idx| graph[idx].clone()).collect();
        members.sort();
        let sample = members.iter().take(CYCLE_SAMPLE_SIZE).cloned().collect();
        cycles.push(CycleGroup {
            id: next_id,
            size: members.len(),
            sample,
        });
        next_id += 1;
    }
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s2_two_node_cycle_is_reported_once_with_both_members() {
        let mut g = Graph::new();
        g.add_edge("File:A.cs", "File:B.cs");
        g.add_edge("File:B.cs", "File:A.cs");

        let cycles = detect_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].id, 1);
        assert_eq!(cycles[0].size, 2);
        assert_eq!(cycles[0].sample, vec!["File:A.cs", "File:B.cs"]);
    }

    #[test]
    fn s3_three_node_cycle_with_satellite_excludes_the_satellite() {
        let mut g = Graph::new();
        g.add_edge("File:A.cs", "File:B.cs");
        g.add_edge("File:B.cs", "File:C.cs");
        g.add_edge("File:C.cs", "File:A.cs");
        g.add_edge("File:D.cs", "File:A.cs");

        let cycles = detect_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].size, 3);
        assert!(!cycles[0].sample.contains(&"File:D.cs".to_string()));
        assert_eq!(g.fan_in("File:A.cs"), 2);
    }

    #[test]
    fn trivial_self_loop_is_not_a_reported_cycle() {
        let mut g = Graph::new();
        g.add_edge("File:A.cs", "File:A.cs");
        assert!(detect_cycles(&g).is_empty());
    }

    #[test]
    fn acyclic_graph_reports_no_cycles() {
        let mut g = Graph::new();
        g.add_edge("File:A.cs", "File:B.cs");
        assert!(detect_cycles(&g).is_empty());
    }
}
