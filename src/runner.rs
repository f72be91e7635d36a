use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use common::{Market, SimulationGraph};
use correlation_engine::CorrelationCache;
use llm_client::AnthropicClient;
use polymarket_client::{new_market_cache, ClientConfig, MarketCache, MarketCacheEntry, PolymarketClient};
use serde::Serialize;
use serde_json::json;
use simulation_engine::{
    estimate_bounds, generate_variants, propagate, summarize, CancelFlag, GraphBuilder,
    GraphSummary, ScenarioSet, UncertaintyBounds,
};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::journal::{now_iso, resolve_runs_dir, RunJournal};

/// Everything a caller needs from one simulation run.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub trigger_id: String,
    pub outcome: String,
    pub graph: SimulationGraph,
    pub summary: GraphSummary,
    pub uncertainty: Vec<UncertaintyBounds>,
    pub scenarios: ScenarioSet,
}

pub struct Runner {
    config: AppConfig,
    client: PolymarketClient,
    generator: AnthropicClient,
    market_cache: MarketCache,
    journal: RunJournal,
}

impl Runner {
    pub fn new(config: AppConfig) -> Result<Self> {
        let api_key =
            std::env::var("ANTHROPIC_API_KEY").context("ANTHROPIC_API_KEY must be set")?;

        let client = PolymarketClient::new(ClientConfig {
            gamma_base: config.polymarket.gamma_base.clone(),
            clob_base: config.polymarket.clob_base.clone(),
            timeout_secs: config.polymarket.timeout_secs,
            history_interval: config.polymarket.history_interval.clone(),
            history_fidelity_minutes: config.polymarket.history_fidelity_minutes,
        });

        let generator = AnthropicClient::new(
            api_key,
            config.llm.model.clone(),
            config.llm.timeout_ms,
            config.llm.max_retries,
        );

        let journal = RunJournal::open(resolve_runs_dir())?;
        info!("Run journal path: {}", journal.dir().display());

        Ok(Self {
            config,
            client,
            generator,
            market_cache: new_market_cache(),
            journal,
        })
    }

    /// Run one simulation: build the graph, propagate, band, and derive
    /// scenarios.
    pub async fn run(&mut self, market_id: &str, outcome: &str) -> Result<SimulationReport> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();

        self.journal.write_event(json!({
            "ts": now_iso(),
            "kind": "run_start",
            "run_id": run_id,
            "trigger_id": market_id,
            "outcome": outcome,
        }));

        let pool = self
            .client
            .get_markets(self.config.pool.min_volume, self.config.pool.max_markets)
            .await?;
        info!("Candidate pool: {} markets", pool.len());
        for market in &pool {
            self.market_cache.insert(
                market.id.clone(),
                MarketCacheEntry {
                    market: market.clone(),
                    updated_at: Instant::now(),
                },
            );
        }

        let trigger = self.resolve_market(market_id).await?;

        let correlation_cache = CorrelationCache::from_config(&self.config.simulation);
        let builder = GraphBuilder::new(&self.generator, &self.client, &self.config.simulation);
        let graph = builder
            .build(&trigger, outcome, &pool, &correlation_cache, &CancelFlag::new())
            .await?;

        // Post-processing passes over the immutable graph.
        let propagated = propagate(&graph);
        let graph = SimulationGraph {
            trigger_id: graph.trigger_id,
            nodes: propagated,
            edges: graph.edges,
        };
        let uncertainty = estimate_bounds(&graph);
        let scenarios = generate_variants(&graph, &uncertainty);
        let summary = summarize(&graph);

        self.journal.write_event(json!({
            "ts": now_iso(),
            "kind": "run_complete",
            "run_id": run_id,
            "trigger_id": market_id,
            "nodes": graph.nodes.len(),
            "edges": graph.edges.len(),
            "markets_affected": summary.total_markets_affected,
            "avg_probability_shift": summary.avg_probability_shift,
            "overall_confidence": summary.overall_confidence,
            "elapsed_ms": started.elapsed().as_millis() as u64,
        }));

        Ok(SimulationReport {
            run_id,
            generated_at: Utc::now(),
            trigger_id: trigger.id,
            outcome: outcome.to_string(),
            graph,
            summary,
            uncertainty,
            scenarios,
        })
    }

    /// Resolve a market by id, preferring a fresh cache entry over a
    /// round-trip.
    async fn resolve_market(&self, market_id: &str) -> Result<Market> {
        if let Some(entry) = self.market_cache.get(market_id) {
            if !entry.is_stale(self.config.polymarket.market_cache_ttl_secs) {
                return Ok(entry.market.clone());
            }
        }
        Ok(self.client.get_market(market_id).await?)
    }
}
