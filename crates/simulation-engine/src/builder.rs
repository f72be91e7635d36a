//! Layered graph construction.
//!
//! Bounded breadth-first growth from the trigger market. Each frontier
//! market asks the candidate generator for related markets, validates
//! every candidate against historical correlation, and admits at most a
//! per-layer number of children — the pyramid narrows as depth grows, so
//! total graph size stays bounded instead of exponential.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use common::providers::{CandidateGenerator, PriceHistoryProvider};
use common::{
    CandidateRelationship, CausalEdge, Error, Market, PricePoint, PriceSeries, Result,
    SimulationConfig, SimulationGraph, SimulationNode,
};
use correlation_engine::{estimate_impact, validate_candidate, CorrelationCache};
use futures_util::future::join_all;
use tracing::{debug, info, warn};

/// Admission caps keyed by the *target* layer, per parent. An explicit
/// table rather than a conditional chain so the pyramid policy stays
/// auditable.
const LAYER_FAN_OUT: &[(usize, usize)] = &[(1, 3), (2, 2), (3, 1)];

/// Per-parent admission cap for a target layer. Depths beyond the table
/// reuse its final cap; they are unreachable at the default max depth.
pub fn layer_fan_out(target_layer: usize) -> usize {
    LAYER_FAN_OUT
        .iter()
        .find(|(layer, _)| *layer == target_layer)
        .or_else(|| LAYER_FAN_OUT.last())
        .map(|(_, cap)| *cap)
        .unwrap_or(0)
}

/// Cooperative cancellation handle. Checked between frontier expansions,
/// so an aborted run never surfaces a partially-built layer as complete.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Builds one simulation graph per invocation.
pub struct GraphBuilder<'a, G, P> {
    generator: &'a G,
    provider: &'a P,
    config: &'a SimulationConfig,
}

impl<'a, G, P> GraphBuilder<'a, G, P>
where
    G: CandidateGenerator,
    P: PriceHistoryProvider,
{
    pub fn new(generator: &'a G, provider: &'a P, config: &'a SimulationConfig) -> Self {
        Self {
            generator,
            provider,
            config,
        }
    }

    /// Build the layered graph for `trigger` with `outcome` assumed
    /// certain.
    ///
    /// The only fatal error before construction is an unknown outcome
    /// label; everything downstream degrades instead of failing. Shock is
    /// computed against the selected outcome's own pre-simulation
    /// probability, and the trigger's predicted probability is fixed at
    /// 1.0 for that outcome.
    pub async fn build(
        &self,
        trigger: &Market,
        outcome: &str,
        pool: &[Market],
        cache: &CorrelationCache,
        cancel: &CancelFlag,
    ) -> Result<SimulationGraph> {
        let outcome_index =
            trigger
                .outcome_index(outcome)
                .ok_or_else(|| Error::UnknownOutcome {
                    market_id: trigger.id.clone(),
                    outcome: outcome.to_string(),
                })?;
        let trigger_prior =
            trigger
                .outcome_probability(outcome_index)
                .ok_or_else(|| Error::UnknownOutcome {
                    market_id: trigger.id.clone(),
                    outcome: outcome.to_string(),
                })?;
        let shock = 1.0 - trigger_prior;

        let mut trigger_node = SimulationNode::new(trigger.clone(), trigger_prior, 0);
        trigger_node.apply_prediction(1.0);

        // Fetched once and memoized for the whole traversal.
        let trigger_series = self.fetch_trigger_series(trigger).await;

        let pool_by_id: HashMap<&str, &Market> = pool
            .iter()
            .filter(|m| m.id != trigger.id)
            .map(|m| (m.id.as_str(), m))
            .collect();

        let mut nodes = vec![trigger_node];
        let mut node_index: HashMap<String, usize> = HashMap::new();
        node_index.insert(trigger.id.clone(), 0);
        let mut edges: Vec<CausalEdge> = Vec::new();

        let mut processed: HashSet<String> = HashSet::new();
        processed.insert(trigger.id.clone());
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        queue.push_back((trigger.id.clone(), 0));

        while let Some((frontier_id, layer)) = queue.pop_front() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if layer >= self.config.max_depth {
                continue;
            }

            let frontier = nodes[node_index[&frontier_id]].market.clone();
            // Keep the caller's pool order so generator prompts stay
            // deterministic.
            let restricted: Vec<Market> = pool
                .iter()
                .filter(|m| m.id != trigger.id && !processed.contains(&m.id))
                .cloned()
                .collect();
            if restricted.is_empty() {
                continue;
            }

            let candidates = match self.generator.generate(&frontier, outcome, &restricted).await
            {
                Ok(candidates) => candidates,
                Err(e) => {
                    // Malformed or failed generation counts as zero
                    // candidates; the branch just stops.
                    warn!("candidate generation failed for {}: {}", frontier_id, e);
                    Vec::new()
                }
            };

            let candidates = self.usable_candidates(candidates, &frontier_id, &processed, &pool_by_id);
            if candidates.is_empty() {
                debug!("{}: no usable candidates", frontier_id);
                continue;
            }

            let target_layer = layer + 1;
            let mut validated = self
                .validate_all(&frontier_id, &trigger.id, trigger_series.as_deref(), &candidates, &pool_by_id, cache)
                .await;

            // Concurrent validation must not affect admission: re-sort
            // deterministically before applying the cap.
            validated.sort_by(|a, b| {
                sort_key(&b.0)
                    .partial_cmp(&sort_key(&a.0))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.target_id.cmp(&b.0.target_id))
            });
            validated.truncate(layer_fan_out(target_layer));

            debug!(
                "{}: admitted {} of {} candidates into layer {}",
                frontier_id,
                validated.len(),
                candidates.len(),
                target_layer
            );

            for (edge, candidate) in validated {
                let target = pool_by_id[edge.target_id.as_str()];
                let Some(current) = target.primary_probability() else {
                    continue;
                };

                let estimate = estimate_impact(
                    edge.correlation.map(|c| c.coefficient),
                    candidate.claimed_strength,
                    candidate.claimed_direction,
                    current,
                    shock,
                );

                let mut node = SimulationNode::new(target.clone(), current, target_layer);
                node.apply_prediction(estimate.predicted_probability);
                node.incoming.push(edge.clone());

                let source_idx = node_index[&edge.source_id];
                nodes[source_idx].outgoing.push(edge.clone());

                processed.insert(target.id.clone());
                node_index.insert(target.id.clone(), nodes.len());
                nodes.push(node);

                let expand = edge.strength > self.config.expansion_min_strength
                    && target_layer < self.config.max_depth;
                if expand {
                    queue.push_back((target.id.clone(), target_layer));
                }
                edges.push(edge);
            }
        }

        info!(
            "graph built: {} nodes, {} edges, max layer {}",
            nodes.len(),
            edges.len(),
            nodes.iter().map(|n| n.layer).max().unwrap_or(0)
        );

        Ok(SimulationGraph {
            trigger_id: trigger.id.clone(),
            nodes,
            edges,
        })
    }

    async fn fetch_trigger_series(&self, trigger: &Market) -> Option<PriceSeries> {
        let token = trigger.series_token.as_deref()?;
        match self.provider.fetch_history(token).await {
            Ok(series) => Some(series),
            Err(e) => {
                warn!("trigger history unavailable for {}: {}", trigger.id, e);
                None
            }
        }
    }

    /// Drop dangling, duplicate, self-referencing, and already-processed
    /// candidates — the generator is not trusted to honor the pool.
    fn usable_candidates(
        &self,
        candidates: Vec<CandidateRelationship>,
        frontier_id: &str,
        processed: &HashSet<String>,
        pool_by_id: &HashMap<&str, &Market>,
    ) -> Vec<CandidateRelationship> {
        let mut seen: HashSet<String> = HashSet::new();
        candidates
            .into_iter()
            .filter(|c| {
                c.target_market_id != frontier_id
                    && !processed.contains(&c.target_market_id)
                    && pool_by_id.contains_key(c.target_market_id.as_str())
                    && seen.insert(c.target_market_id.clone())
            })
            .collect()
    }

    async fn validate_all(
        &self,
        frontier_id: &str,
        trigger_id: &str,
        trigger_series: Option<&[PricePoint]>,
        candidates: &[CandidateRelationship],
        pool_by_id: &HashMap<&str, &Market>,
        cache: &CorrelationCache,
    ) -> Vec<(CausalEdge, CandidateRelationship)> {
        // Per-candidate validations are independent and read-only, so
        // they run concurrently on this task.
        let futures = candidates.iter().map(|candidate| {
            let target = pool_by_id[candidate.target_market_id.as_str()];
            async move {
                let edge = validate_candidate(
                    self.provider,
                    cache,
                    self.config,
                    frontier_id,
                    trigger_id,
                    trigger_series,
                    candidate,
                    target,
                )
                .await;
                edge.map(|edge| (edge, candidate.clone()))
            }
        });

        join_all(futures)
            .await
            .into_iter()
            .flatten()
            // Only historically-backed edges enter the graph.
            .filter(|(edge, _)| edge.has_historical_data)
            .collect()
    }
}

fn sort_key(edge: &CausalEdge) -> f64 {
    edge.correlation
        .map(|c| c.coefficient.abs())
        .unwrap_or(edge.strength)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_out_table() {
        assert_eq!(layer_fan_out(1), 3);
        assert_eq!(layer_fan_out(2), 2);
        assert_eq!(layer_fan_out(3), 1);
        // Beyond the table: reuse the final cap.
        assert_eq!(layer_fan_out(4), 1);
    }

    #[test]
    fn test_cancel_flag_roundtrip() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());
        let shared = flag.clone();
        shared.cancel();
        assert!(flag.is_cancelled());
    }
}
