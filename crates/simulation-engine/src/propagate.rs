//! Multi-parent probability propagation.
//!
//! A separate pass from graph construction: the builder assigns each node
//! an initial estimate from its discovery edge, while propagation folds
//! in *all* incoming edges, which is what makes multi-parent nodes work.

use std::collections::HashMap;

use common::{clamp_probability, ConfidenceLevel, SimulationGraph, SimulationNode};

/// Propagation weight per confidence bucket.
pub fn confidence_weight(level: ConfidenceLevel) -> f64 {
    match level {
        ConfidenceLevel::High => 1.0,
        ConfidenceLevel::Medium => 0.7,
        ConfidenceLevel::Low => 0.4,
    }
}

/// Recompute every non-trigger node's predicted probability as the
/// confidence-weighted average influence of its incoming edges.
///
/// Nodes are processed in ascending layer order (ties broken by market
/// id) so a parent's propagated value is in place before its children
/// read it. Layer 0 is never recomputed; nodes without incoming edges
/// are left unchanged. Returns a new node set — the input graph is not
/// mutated.
pub fn propagate(graph: &SimulationGraph) -> Vec<SimulationNode> {
    let mut nodes = graph.nodes.clone();

    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| {
        nodes[a]
            .layer
            .cmp(&nodes[b].layer)
            .then_with(|| nodes[a].market.id.cmp(&nodes[b].market.id))
    });

    // market id → (predicted, current), updated as layers resolve.
    let mut resolved: HashMap<String, (f64, f64)> = nodes
        .iter()
        .map(|n| {
            (
                n.market.id.clone(),
                (n.predicted_probability, n.current_probability),
            )
        })
        .collect();

    for idx in order {
        if nodes[idx].layer == 0 || nodes[idx].incoming.is_empty() {
            continue;
        }

        let mut weighted_influence = 0.0;
        let mut total_weight = 0.0;
        for edge in &nodes[idx].incoming {
            let Some(&(source_predicted, source_current)) = resolved.get(&edge.source_id) else {
                continue;
            };
            let source_shock = source_predicted - source_current;
            let influence = source_shock * edge.strength * edge.direction.sign();
            let weight = confidence_weight(edge.confidence);
            weighted_influence += influence * weight;
            total_weight += weight;
        }
        if total_weight <= 0.0 {
            continue;
        }

        let node = &mut nodes[idx];
        let predicted =
            clamp_probability(node.current_probability + weighted_influence / total_weight);
        node.apply_prediction(predicted);
        resolved.insert(
            node.market.id.clone(),
            (predicted, node.current_probability),
        );
    }

    nodes
}
