//! Domain types shared across the simulation engine.

use serde::{Deserialize, Serialize};

/// Lower clamp bound — predicted probabilities never express certainty.
pub const PROB_FLOOR: f64 = 0.01;
/// Upper clamp bound.
pub const PROB_CEIL: f64 = 0.99;

/// Clamp a probability into the representable band.
pub fn clamp_probability(value: f64) -> f64 {
    value.clamp(PROB_FLOOR, PROB_CEIL)
}

// ── Market Types ──────────────────────────────────────────────────────

/// A prediction market as seen by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub id: String,
    pub question: String,
    /// Ordered outcome labels, e.g. ["Yes", "No"].
    #[serde(default)]
    pub outcomes: Vec<String>,
    /// Current probability per outcome, parallel to `outcomes`.
    /// Values lie in (0,1) in practice; the sum is unconstrained.
    #[serde(default)]
    pub outcome_prices: Vec<f64>,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub category: String,
    /// Token for the price-history provider, if the market has one.
    #[serde(default)]
    pub series_token: Option<String>,
}

impl Market {
    /// Index of an outcome label, matched case-insensitively.
    pub fn outcome_index(&self, label: &str) -> Option<usize> {
        self.outcomes
            .iter()
            .position(|o| o.eq_ignore_ascii_case(label))
    }

    /// Current probability of the outcome at `index`.
    pub fn outcome_probability(&self, index: usize) -> Option<f64> {
        self.outcome_prices.get(index).copied()
    }

    /// Probability of the first listed outcome — the price a non-trigger
    /// node tracks through the simulation.
    pub fn primary_probability(&self) -> Option<f64> {
        self.outcome_prices.first().copied()
    }
}

/// One observation in a market's price history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix timestamp, seconds.
    pub ts: i64,
    /// Price in [0,1].
    pub price: f64,
}

/// Time-ordered price observations; may be empty or sparse.
pub type PriceSeries = Vec<PricePoint>;

// ── Candidate & Edge Types ────────────────────────────────────────────

/// Claimed time lag for an effect to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeLag {
    Immediate,
    Hours,
    Days,
    Weeks,
}

/// Claimed or resolved direction of an effect on the target's probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    /// Sign multiplier for propagation math.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Increase => 1.0,
            Direction::Decrease => -1.0,
        }
    }
}

/// Three-bucket discretization of an edge's reliability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Discretized size of a node's predicted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

impl ImpactLevel {
    /// Bucket a percent change: high above 30%, medium above 10%.
    pub fn from_percent_change(percent: f64) -> Self {
        let magnitude = percent.abs();
        if magnitude > 30.0 {
            ImpactLevel::High
        } else if magnitude > 10.0 {
            ImpactLevel::Medium
        } else {
            ImpactLevel::Low
        }
    }
}

/// A candidate relationship asserted by the reasoning collaborator.
/// Nothing here is statistically derived; the validator decides what
/// survives into the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRelationship {
    pub target_market_id: String,
    pub reasoning: String,
    pub time_lag: TimeLag,
    /// Claimed strength in [0,1].
    pub claimed_strength: f64,
    pub claimed_direction: Direction,
}

/// Outcome of correlating two aligned price series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Pearson r in [-1,1].
    pub coefficient: f64,
    /// Number of aligned points the coefficient was computed over.
    pub sample_size: usize,
    /// Derived statistical confidence in [0,1] — distinct from any
    /// externally claimed strength.
    pub confidence: f64,
}

/// A validated causal edge between two markets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalEdge {
    pub source_id: String,
    pub target_id: String,
    /// Final strength in [0,1].
    pub strength: f64,
    pub direction: Direction,
    pub time_lag: TimeLag,
    pub confidence: ConfidenceLevel,
    pub explanation: String,
    /// Present when the edge is backed by historical data.
    pub correlation: Option<CorrelationResult>,
    /// False when the edge rests purely on the external claim.
    pub has_historical_data: bool,
}

// ── Graph Types ───────────────────────────────────────────────────────

/// A market's place in the simulation graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationNode {
    pub market: Market,
    pub current_probability: f64,
    pub predicted_probability: f64,
    /// predicted − current.
    pub probability_change: f64,
    /// Change relative to the current probability, in percent.
    pub percent_change: f64,
    /// Traversal depth; 0 is the trigger.
    pub layer: usize,
    pub impact: ImpactLevel,
    pub incoming: Vec<CausalEdge>,
    pub outgoing: Vec<CausalEdge>,
}

impl SimulationNode {
    pub fn new(market: Market, current_probability: f64, layer: usize) -> Self {
        Self {
            market,
            current_probability,
            predicted_probability: current_probability,
            probability_change: 0.0,
            percent_change: 0.0,
            layer,
            impact: ImpactLevel::Low,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Set a new predicted probability and recompute the derived fields.
    pub fn apply_prediction(&mut self, predicted: f64) {
        self.predicted_probability = predicted;
        self.probability_change = predicted - self.current_probability;
        self.percent_change = if self.current_probability.abs() > f64::EPSILON {
            self.probability_change / self.current_probability * 100.0
        } else {
            0.0
        };
        self.impact = ImpactLevel::from_percent_change(self.percent_change);
    }
}

/// The complete simulation graph: nodes unique by market id, plus the
/// validated edges between them. Built once per run; downstream passes
/// treat it as immutable input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationGraph {
    pub trigger_id: String,
    pub nodes: Vec<SimulationNode>,
    pub edges: Vec<CausalEdge>,
}

impl SimulationGraph {
    pub fn node(&self, market_id: &str) -> Option<&SimulationNode> {
        self.nodes.iter().find(|n| n.market.id == market_id)
    }

    pub fn trigger(&self) -> Option<&SimulationNode> {
        self.node(&self.trigger_id)
    }

    /// Deepest layer any node reached.
    pub fn max_layer(&self) -> usize {
        self.nodes.iter().map(|n| n.layer).max().unwrap_or(0)
    }

    /// Nodes other than the trigger.
    pub fn affected(&self) -> impl Iterator<Item = &SimulationNode> {
        self.nodes.iter().filter(|n| n.layer > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_index_case_insensitive() {
        let market = Market {
            id: "m1".into(),
            question: "Will it happen?".into(),
            outcomes: vec!["Yes".into(), "No".into()],
            outcome_prices: vec![0.4, 0.6],
            volume: 1000.0,
            category: String::new(),
            series_token: None,
        };
        assert_eq!(market.outcome_index("yes"), Some(0));
        assert_eq!(market.outcome_index("NO"), Some(1));
        assert_eq!(market.outcome_index("Maybe"), None);
    }

    #[test]
    fn test_impact_level_thresholds() {
        assert_eq!(ImpactLevel::from_percent_change(66.7), ImpactLevel::High);
        assert_eq!(ImpactLevel::from_percent_change(-35.0), ImpactLevel::High);
        assert_eq!(ImpactLevel::from_percent_change(15.0), ImpactLevel::Medium);
        assert_eq!(ImpactLevel::from_percent_change(5.0), ImpactLevel::Low);
    }

    #[test]
    fn test_apply_prediction_recomputes_fields() {
        let market = Market {
            id: "m1".into(),
            question: String::new(),
            outcomes: vec!["Yes".into()],
            outcome_prices: vec![0.30],
            volume: 0.0,
            category: String::new(),
            series_token: None,
        };
        let mut node = SimulationNode::new(market, 0.30, 1);
        node.apply_prediction(0.50);
        assert!((node.probability_change - 0.20).abs() < 1e-9);
        assert!((node.percent_change - 66.666_666_666_666_67).abs() < 1e-6);
        assert_eq!(node.impact, ImpactLevel::High);
    }

    #[test]
    fn test_clamp_probability_band() {
        assert_eq!(clamp_probability(1.5), PROB_CEIL);
        assert_eq!(clamp_probability(-0.2), PROB_FLOOR);
        assert_eq!(clamp_probability(0.5), 0.5);
    }
}
