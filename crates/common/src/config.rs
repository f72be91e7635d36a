//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunables for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Maximum traversal depth; the trigger sits at layer 0.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Timestamp tolerance when aligning two price series (seconds).
    #[serde(default = "default_align_tolerance")]
    pub align_tolerance_secs: i64,

    /// Minimum aligned points for a correlation to be usable.
    #[serde(default = "default_min_aligned_points")]
    pub min_aligned_points: usize,

    /// Minimum |r| for a candidate to pass the statistical gate.
    #[serde(default = "default_min_abs_correlation")]
    pub min_abs_correlation: f64,

    /// Minimum claimed strength for a candidate to pass the claim gate.
    #[serde(default = "default_min_claimed_strength")]
    pub min_claimed_strength: f64,

    /// A node expands into the next layer only above this final strength.
    #[serde(default = "default_expansion_min_strength")]
    pub expansion_min_strength: f64,

    /// Correlation cache entry lifetime (seconds).
    #[serde(default = "default_correlation_ttl")]
    pub correlation_cache_ttl_secs: u64,

    /// Correlation cache size bound.
    #[serde(default = "default_correlation_cap")]
    pub correlation_cache_max_entries: usize,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_max_depth() -> usize {
    3
}
fn default_align_tolerance() -> i64 {
    3600
}
fn default_min_aligned_points() -> usize {
    10
}
fn default_min_abs_correlation() -> f64 {
    0.20
}
fn default_min_claimed_strength() -> f64 {
    0.5
}
fn default_expansion_min_strength() -> f64 {
    0.5
}
fn default_correlation_ttl() -> u64 {
    900
}
fn default_correlation_cap() -> usize {
    4096
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            align_tolerance_secs: default_align_tolerance(),
            min_aligned_points: default_min_aligned_points(),
            min_abs_correlation: default_min_abs_correlation(),
            min_claimed_strength: default_min_claimed_strength(),
            expansion_min_strength: default_expansion_min_strength(),
            correlation_cache_ttl_secs: default_correlation_ttl(),
            correlation_cache_max_entries: default_correlation_cap(),
        }
    }
}
