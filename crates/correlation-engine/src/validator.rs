//! Candidate validation.
//!
//! Combines the externally claimed relationship with historical evidence:
//! candidates with usable price history must clear both the statistical
//! gate and the claim gate (an AND policy); candidates without usable
//! history are downgraded, never rejected outright, so the caller can
//! still see the claim at reduced strength.

use common::providers::PriceHistoryProvider;
use common::{
    CandidateRelationship, CausalEdge, ConfidenceLevel, CorrelationResult, Direction, Market,
    PricePoint, SimulationConfig,
};
use tracing::debug;

use crate::align::align_series;
use crate::cache::CorrelationCache;
use crate::pearson::correlate;

/// Validate one candidate edge from `source_id` to `target`.
///
/// Returns `None` when the candidate fails the AND gate; a downgraded
/// edge (`has_historical_data = false`, strength halved) when history is
/// missing or too short; a historically-backed edge otherwise. Provider
/// failures take the downgrade path — data unavailability never aborts a
/// run.
pub async fn validate_candidate<P: PriceHistoryProvider>(
    provider: &P,
    cache: &CorrelationCache,
    config: &SimulationConfig,
    source_id: &str,
    trigger_id: &str,
    trigger_series: Option<&[PricePoint]>,
    candidate: &CandidateRelationship,
    target: &Market,
) -> Option<CausalEdge> {
    let trigger_series = match trigger_series {
        Some(series) if series.len() >= config.min_aligned_points => series,
        _ => return Some(downgraded_edge(source_id, candidate)),
    };

    let token = match target.series_token.as_deref() {
        Some(token) => token,
        None => return Some(downgraded_edge(source_id, candidate)),
    };

    let correlation = match cache.get(trigger_id, &target.id) {
        Some(cached) => cached,
        None => {
            let target_series = match provider.fetch_history(token).await {
                Ok(series) => series,
                Err(e) => {
                    debug!("history fetch failed for {}: {}", target.id, e);
                    return Some(downgraded_edge(source_id, candidate));
                }
            };

            let aligned =
                align_series(trigger_series, &target_series, config.align_tolerance_secs);
            if aligned.len() < config.min_aligned_points {
                debug!(
                    "{} aligned points for {} (need {})",
                    aligned.len(),
                    target.id,
                    config.min_aligned_points
                );
                return Some(downgraded_edge(source_id, candidate));
            }

            let result = correlate(&aligned.left, &aligned.right);
            cache.insert(trigger_id, &target.id, result);
            result
        }
    };

    accept_or_reject(source_id, candidate, target, correlation, config)
}

fn accept_or_reject(
    source_id: &str,
    candidate: &CandidateRelationship,
    target: &Market,
    correlation: CorrelationResult,
    config: &SimulationConfig,
) -> Option<CausalEdge> {
    let r = correlation.coefficient;

    // Both the statistical and the claimed confidence must clear their
    // thresholds.
    if r.abs() < config.min_abs_correlation
        || candidate.claimed_strength < config.min_claimed_strength
    {
        debug!(
            "rejected {} -> {}: |r|={:.3} claimed={:.2}",
            source_id,
            target.id,
            r.abs(),
            candidate.claimed_strength
        );
        return None;
    }

    let strength = ((r.abs() + candidate.claimed_strength) / 2.0).clamp(0.0, 1.0);
    let direction = if r >= 0.0 {
        Direction::Increase
    } else {
        Direction::Decrease
    };
    let confidence = if r.abs() > 0.6 {
        ConfidenceLevel::High
    } else if r.abs() > 0.3 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    };

    Some(CausalEdge {
        source_id: source_id.to_string(),
        target_id: target.id.clone(),
        strength,
        direction,
        time_lag: candidate.time_lag,
        confidence,
        explanation: format!(
            "{} (historical correlation {:.2} over {} aligned points)",
            candidate.reasoning, r, correlation.sample_size
        ),
        correlation: Some(correlation),
        has_historical_data: true,
    })
}

fn downgraded_edge(source_id: &str, candidate: &CandidateRelationship) -> CausalEdge {
    CausalEdge {
        source_id: source_id.to_string(),
        target_id: candidate.target_market_id.clone(),
        strength: (candidate.claimed_strength / 2.0).clamp(0.0, 1.0),
        direction: candidate.claimed_direction,
        time_lag: candidate.time_lag,
        confidence: ConfidenceLevel::Low,
        explanation: format!("{} (no usable price history)", candidate.reasoning),
        correlation: None,
        has_historical_data: false,
    }
}
