//! Summary metadata for the UI/API layer.

use common::{ConfidenceLevel, SimulationGraph, TimeLag};
use serde::Serialize;

/// Score per confidence bucket for the overall-confidence mean.
pub fn confidence_score(level: ConfidenceLevel) -> f64 {
    match level {
        ConfidenceLevel::High => 90.0,
        ConfidenceLevel::Medium => 70.0,
        ConfidenceLevel::Low => 50.0,
    }
}

/// Aggregates reported alongside the graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    /// Non-trigger node count.
    pub total_markets_affected: usize,
    /// Mean |predicted − current| across non-trigger nodes.
    pub avg_probability_shift: f64,
    /// Max |predicted − current| across non-trigger nodes.
    pub max_probability_shift: f64,
    /// Mean per-edge confidence score; 0 for an edgeless graph.
    pub overall_confidence: f64,
    /// Derived from the deepest layer reached.
    pub time_horizon: TimeLag,
}

/// Summarize a graph. Safe on a trigger-only graph: all aggregates are
/// zero, never a division by zero.
pub fn summarize(graph: &SimulationGraph) -> GraphSummary {
    let shifts: Vec<f64> = graph
        .affected()
        .map(|n| n.probability_change.abs())
        .collect();

    let avg_probability_shift = if shifts.is_empty() {
        0.0
    } else {
        shifts.iter().sum::<f64>() / shifts.len() as f64
    };
    let max_probability_shift = shifts.iter().copied().fold(0.0, f64::max);

    let overall_confidence = if graph.edges.is_empty() {
        0.0
    } else {
        graph
            .edges
            .iter()
            .map(|e| confidence_score(e.confidence))
            .sum::<f64>()
            / graph.edges.len() as f64
    };

    GraphSummary {
        total_markets_affected: shifts.len(),
        avg_probability_shift,
        max_probability_shift,
        overall_confidence,
        time_horizon: horizon_for_layer(graph.max_layer()),
    }
}

fn horizon_for_layer(max_layer: usize) -> TimeLag {
    match max_layer {
        0 => TimeLag::Immediate,
        1 => TimeLag::Hours,
        2 => TimeLag::Days,
        _ => TimeLag::Weeks,
    }
}
