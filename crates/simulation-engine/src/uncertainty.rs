//! Heuristic uncertainty bands.
//!
//! Every hop from the trigger compounds estimation error, and weakly
//! backed edges compound it further. The band is a heuristic, not a
//! statistical interval.

use common::{clamp_probability, ConfidenceLevel, SimulationGraph};
use serde::Serialize;

const LAYER_PENALTY: f64 = 0.05;
const CONFIDENCE_PENALTY: f64 = 0.15;

/// Uncertainty weight per confidence bucket — intentionally different
/// from the propagation weights.
pub fn uncertainty_weight(level: ConfidenceLevel) -> f64 {
    match level {
        ConfidenceLevel::High => 0.9,
        ConfidenceLevel::Medium => 0.7,
        ConfidenceLevel::Low => 0.5,
    }
}

/// ± band around one node's predicted probability.
#[derive(Debug, Clone, Serialize)]
pub struct UncertaintyBounds {
    pub market_id: String,
    pub uncertainty: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Compute per-node bounds: `layer × 0.05 + (1 − mean incoming
/// confidence weight) × 0.15`, clamped around the predicted value. The
/// trigger gets zero-width bounds — its outcome is assumed, not
/// estimated.
pub fn estimate_bounds(graph: &SimulationGraph) -> Vec<UncertaintyBounds> {
    graph
        .nodes
        .iter()
        .map(|node| {
            if node.layer == 0 {
                return UncertaintyBounds {
                    market_id: node.market.id.clone(),
                    uncertainty: 0.0,
                    lower: node.predicted_probability,
                    upper: node.predicted_probability,
                };
            }

            let mean_weight = if node.incoming.is_empty() {
                uncertainty_weight(ConfidenceLevel::Low)
            } else {
                node.incoming
                    .iter()
                    .map(|e| uncertainty_weight(e.confidence))
                    .sum::<f64>()
                    / node.incoming.len() as f64
            };

            let uncertainty =
                node.layer as f64 * LAYER_PENALTY + (1.0 - mean_weight) * CONFIDENCE_PENALTY;

            UncertaintyBounds {
                market_id: node.market.id.clone(),
                uncertainty,
                lower: clamp_probability(node.predicted_probability - uncertainty),
                upper: clamp_probability(node.predicted_probability + uncertainty),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{CausalEdge, Direction, Market, SimulationNode, TimeLag};

    fn make_node(id: &str, layer: usize, predicted: f64) -> SimulationNode {
        let market = Market {
            id: id.into(),
            question: String::new(),
            outcomes: vec!["Yes".into()],
            outcome_prices: vec![0.5],
            volume: 0.0,
            category: String::new(),
            series_token: None,
        };
        let mut node = SimulationNode::new(market, 0.5, layer);
        node.apply_prediction(predicted);
        node
    }

    fn make_edge(confidence: ConfidenceLevel) -> CausalEdge {
        CausalEdge {
            source_id: "s".into(),
            target_id: "t".into(),
            strength: 0.5,
            direction: Direction::Increase,
            time_lag: TimeLag::Days,
            confidence,
            explanation: String::new(),
            correlation: None,
            has_historical_data: true,
        }
    }

    #[test]
    fn test_trigger_has_zero_width_bounds() {
        let graph = SimulationGraph {
            trigger_id: "t".into(),
            nodes: vec![make_node("t", 0, 1.0)],
            edges: vec![],
        };
        let bounds = estimate_bounds(&graph);
        assert_eq!(bounds[0].uncertainty, 0.0);
        assert_eq!(bounds[0].lower, 1.0);
        assert_eq!(bounds[0].upper, 1.0);
    }

    #[test]
    fn test_layer_and_confidence_both_widen() {
        let mut high = make_node("a", 1, 0.5);
        high.incoming.push(make_edge(ConfidenceLevel::High));
        let mut low = make_node("b", 2, 0.5);
        low.incoming.push(make_edge(ConfidenceLevel::Low));

        let graph = SimulationGraph {
            trigger_id: "t".into(),
            nodes: vec![make_node("t", 0, 1.0), high, low],
            edges: vec![],
        };
        let bounds = estimate_bounds(&graph);

        // layer 1, weight 0.9 → 0.05 + 0.1*0.15 = 0.065.
        assert!((bounds[1].uncertainty - 0.065).abs() < 1e-9, "got {}", bounds[1].uncertainty);
        // layer 2, weight 0.5 → 0.10 + 0.5*0.15 = 0.175.
        assert!((bounds[2].uncertainty - 0.175).abs() < 1e-9, "got {}", bounds[2].uncertainty);
        assert!(bounds[2].uncertainty > bounds[1].uncertainty);
    }

    #[test]
    fn test_bounds_are_clamped() {
        let mut node = make_node("a", 3, 0.98);
        node.incoming.push(make_edge(ConfidenceLevel::Low));
        let graph = SimulationGraph {
            trigger_id: "t".into(),
            nodes: vec![make_node("t", 0, 1.0), node],
            edges: vec![],
        };
        let bounds = estimate_bounds(&graph);
        assert_eq!(bounds[1].upper, 0.99);
        assert!(bounds[1].lower >= 0.01);
    }
}
