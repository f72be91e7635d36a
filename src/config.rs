use common::SimulationConfig;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub polymarket: PolymarketConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolymarketConfig {
    /// Gamma API base; empty means the built-in default.
    #[serde(default)]
    pub gamma_base: String,
    /// CLOB API base; empty means the built-in default.
    #[serde(default)]
    pub clob_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_history_interval")]
    pub history_interval: String,
    #[serde(default = "default_history_fidelity")]
    pub history_fidelity_minutes: u32,
    /// Max age for cached market data (seconds).
    #[serde(default = "default_market_cache_ttl")]
    pub market_cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_llm_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Cap on candidate-pool size handed to the generator.
    #[serde(default = "default_max_markets")]
    pub max_markets: usize,
    /// Minimum market volume for pool membership.
    #[serde(default = "default_min_volume")]
    pub min_volume: f64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_timeout_secs() -> u64 {
    15
}
fn default_history_interval() -> String {
    "max".into()
}
fn default_history_fidelity() -> u32 {
    60
}
fn default_market_cache_ttl() -> u64 {
    300
}
fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_llm_timeout_ms() -> u64 {
    30_000
}
fn default_llm_retries() -> u32 {
    2
}
fn default_max_markets() -> usize {
    200
}
fn default_min_volume() -> f64 {
    10_000.0
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            gamma_base: String::new(),
            clob_base: String::new(),
            timeout_secs: default_timeout_secs(),
            history_interval: default_history_interval(),
            history_fidelity_minutes: default_history_fidelity(),
            market_cache_ttl_secs: default_market_cache_ttl(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            timeout_ms: default_llm_timeout_ms(),
            max_retries: default_llm_retries(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_markets: default_max_markets(),
            min_volume: default_min_volume(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file; a missing file means defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config: AppConfig = toml::from_str(&content)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path);
                Ok(AppConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}
