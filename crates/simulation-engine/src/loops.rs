//! Feedback-loop detection.
//!
//! The builder's processed-set discipline should make cycles impossible,
//! but edges may later be merged or replayed from other runs, so cycle
//! detection stays available as an independent diagnostic. It is an
//! invariant check, not a runtime dependency of propagation.

use std::collections::{HashMap, HashSet};

use common::SimulationGraph;

/// Find cycles in the directed edge set.
///
/// Standard DFS with a visited set and an on-stack set; whenever a back
/// edge to an on-stack node is found, the cyclic suffix of the current
/// path is recorded. Start nodes are visited in sorted order so output
/// is deterministic.
pub fn detect_cycles(graph: &SimulationGraph) -> Vec<Vec<String>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &graph.edges {
        adjacency
            .entry(edge.source_id.as_str())
            .or_default()
            .push(edge.target_id.as_str());
    }
    for targets in adjacency.values_mut() {
        targets.sort_unstable();
    }

    let mut starts: Vec<&str> = graph.nodes.iter().map(|n| n.market.id.as_str()).collect();
    starts.sort_unstable();

    let mut cycles: Vec<Vec<String>> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();

    for start in starts {
        if visited.contains(start) {
            continue;
        }
        let mut path: Vec<&str> = Vec::new();
        let mut on_stack: HashSet<&str> = HashSet::new();
        dfs(start, &adjacency, &mut visited, &mut on_stack, &mut path, &mut cycles);
    }

    cycles
}

fn dfs<'a>(
    node: &'a str,
    adjacency: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    on_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
    cycles: &mut Vec<Vec<String>>,
) {
    visited.insert(node);
    on_stack.insert(node);
    path.push(node);

    if let Some(targets) = adjacency.get(node) {
        for &target in targets {
            if on_stack.contains(target) {
                // Back edge: record the cyclic suffix of the path.
                let from = path.iter().position(|&n| n == target).unwrap_or(0);
                cycles.push(path[from..].iter().map(|s| s.to_string()).collect());
            } else if !visited.contains(target) {
                dfs(target, adjacency, visited, on_stack, path, cycles);
            }
        }
    }

    path.pop();
    on_stack.remove(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{CausalEdge, ConfidenceLevel, Direction, Market, SimulationNode, TimeLag};

    fn make_node(id: &str, layer: usize) -> SimulationNode {
        SimulationNode::new(
            Market {
                id: id.into(),
                question: String::new(),
                outcomes: vec!["Yes".into()],
                outcome_prices: vec![0.5],
                volume: 0.0,
                category: String::new(),
                series_token: None,
            },
            0.5,
            layer,
        )
    }

    fn make_edge(source: &str, target: &str) -> CausalEdge {
        CausalEdge {
            source_id: source.into(),
            target_id: target.into(),
            strength: 0.5,
            direction: Direction::Increase,
            time_lag: TimeLag::Days,
            confidence: ConfidenceLevel::Medium,
            explanation: String::new(),
            correlation: None,
            has_historical_data: true,
        }
    }

    fn make_graph(edges: Vec<CausalEdge>, ids: &[&str]) -> SimulationGraph {
        SimulationGraph {
            trigger_id: ids[0].into(),
            nodes: ids
                .iter()
                .enumerate()
                .map(|(i, id)| make_node(id, i))
                .collect(),
            edges,
        }
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let graph = make_graph(
            vec![make_edge("a", "b"), make_edge("a", "c"), make_edge("b", "c")],
            &["a", "b", "c"],
        );
        assert!(detect_cycles(&graph).is_empty());
    }

    #[test]
    fn test_simple_cycle_is_found() {
        let graph = make_graph(
            vec![make_edge("a", "b"), make_edge("b", "c"), make_edge("c", "a")],
            &["a", "b", "c"],
        );
        let cycles = detect_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], vec!["a", "b", "c"]);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = make_graph(vec![make_edge("a", "a")], &["a"]);
        let cycles = detect_cycles(&graph);
        assert_eq!(cycles, vec![vec!["a".to_string()]]);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        // a→b, a→c, b→d, c→d: two paths converge without cycling.
        let graph = make_graph(
            vec![
                make_edge("a", "b"),
                make_edge("a", "c"),
                make_edge("b", "d"),
                make_edge("c", "d"),
            ],
            &["a", "b", "c", "d"],
        );
        assert!(detect_cycles(&graph).is_empty());
    }
}
