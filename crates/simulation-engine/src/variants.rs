//! Scenario variants.
//!
//! Three readings of the same graph: conservative takes every non-trigger
//! node's lower uncertainty bound, aggressive the upper, expected the
//! propagated values unchanged.

use std::collections::HashMap;

use common::{SimulationGraph, SimulationNode};
use serde::Serialize;

use crate::uncertainty::UncertaintyBounds;

/// Parallel node sets for the three scenarios.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSet {
    pub conservative: Vec<SimulationNode>,
    pub expected: Vec<SimulationNode>,
    pub aggressive: Vec<SimulationNode>,
}

/// Produce the three scenario node sets from one graph and its bounds.
/// Trigger node values are identical across all variants.
pub fn generate_variants(graph: &SimulationGraph, bounds: &[UncertaintyBounds]) -> ScenarioSet {
    let by_id: HashMap<&str, &UncertaintyBounds> =
        bounds.iter().map(|b| (b.market_id.as_str(), b)).collect();

    let substitute = |pick: fn(&UncertaintyBounds) -> f64| -> Vec<SimulationNode> {
        graph
            .nodes
            .iter()
            .map(|node| {
                let mut node = node.clone();
                if node.layer > 0 {
                    if let Some(b) = by_id.get(node.market.id.as_str()) {
                        node.apply_prediction(pick(b));
                    }
                }
                node
            })
            .collect()
    };

    ScenarioSet {
        conservative: substitute(|b| b.lower),
        expected: graph.nodes.clone(),
        aggressive: substitute(|b| b.upper),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uncertainty::estimate_bounds;
    use common::{CausalEdge, ConfidenceLevel, Direction, Market, TimeLag};

    fn make_node(id: &str, layer: usize, current: f64, predicted: f64) -> SimulationNode {
        let market = Market {
            id: id.into(),
            question: String::new(),
            outcomes: vec!["Yes".into()],
            outcome_prices: vec![current],
            volume: 0.0,
            category: String::new(),
            series_token: None,
        };
        let mut node = SimulationNode::new(market, current, layer);
        node.apply_prediction(predicted);
        node
    }

    fn make_graph() -> SimulationGraph {
        let trigger = make_node("trigger", 0, 0.2, 1.0);
        let mut child = make_node("child", 1, 0.3, 0.5);
        child.incoming.push(CausalEdge {
            source_id: "trigger".into(),
            target_id: "child".into(),
            strength: 0.55,
            direction: Direction::Increase,
            time_lag: TimeLag::Days,
            confidence: ConfidenceLevel::Medium,
            explanation: String::new(),
            correlation: None,
            has_historical_data: true,
        });
        SimulationGraph {
            trigger_id: "trigger".into(),
            nodes: vec![trigger, child],
            edges: vec![],
        }
    }

    #[test]
    fn test_variant_ordering_for_positive_change() {
        let graph = make_graph();
        let bounds = estimate_bounds(&graph);
        let scenarios = generate_variants(&graph, &bounds);

        let conservative = scenarios.conservative[1].predicted_probability;
        let expected = scenarios.expected[1].predicted_probability;
        let aggressive = scenarios.aggressive[1].predicted_probability;

        assert!(
            aggressive >= expected && expected >= conservative,
            "{} >= {} >= {} violated",
            aggressive,
            expected,
            conservative
        );
    }

    #[test]
    fn test_trigger_identical_across_variants() {
        let graph = make_graph();
        let bounds = estimate_bounds(&graph);
        let scenarios = generate_variants(&graph, &bounds);

        for set in [
            &scenarios.conservative,
            &scenarios.expected,
            &scenarios.aggressive,
        ] {
            assert_eq!(set[0].predicted_probability, 1.0);
        }
    }
}
