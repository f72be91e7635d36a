//! REST endpoints.

use std::error::Error as StdError;
use std::time::Duration;

use common::providers::PriceHistoryProvider;
use common::{Error, Market, PricePoint, PriceSeries};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::rate_limit::RateLimiter;

const GAMMA_BASE_URL: &str = "https://gamma-api.polymarket.com";
const CLOB_BASE_URL: &str = "https://clob.polymarket.com";

/// Gamma paginates by offset; one page of this size per request.
const PAGE_SIZE: usize = 100;

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn resolve_base_url(configured: &str, env_key: &str, fallback: &str) -> String {
    if let Ok(override_url) = std::env::var(env_key) {
        let normalized = normalize_base_url(&override_url);
        if !normalized.is_empty() {
            info!("Using {} override: {}", env_key, normalized);
            return normalized;
        }
        warn!("Ignoring empty {} override", env_key);
    }
    let configured = normalize_base_url(configured);
    if configured.is_empty() {
        fallback.to_string()
    } else {
        configured
    }
}

fn format_reqwest_error(err: &reqwest::Error) -> String {
    // Keep chained causes so network failures (DNS/TLS/socket) are visible.
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !cause_msg.is_empty() && !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }

    message
}

/// Connection and query settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub gamma_base: String,
    pub clob_base: String,
    pub timeout_secs: u64,
    /// Interval requested from prices-history, e.g. "1w" or "max".
    pub history_interval: String,
    /// Candle fidelity in minutes.
    pub history_fidelity_minutes: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gamma_base: GAMMA_BASE_URL.into(),
            clob_base: CLOB_BASE_URL.into(),
            timeout_secs: 15,
            history_interval: "max".into(),
            history_fidelity_minutes: 60,
        }
    }
}

// ── Gamma wire types ──────────────────────────────────────────────────

/// A market row as Gamma returns it. `outcomes`, `outcome_prices`, and
/// `clob_token_ids` arrive as JSON-encoded arrays *inside* JSON strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMarket {
    id: String,
    #[serde(default)]
    question: String,
    #[serde(default)]
    outcomes: Option<String>,
    #[serde(default)]
    outcome_prices: Option<String>,
    #[serde(default)]
    volume_num: Option<f64>,
    #[serde(default)]
    volume: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    clob_token_ids: Option<String>,
}

fn decode_string_array(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
        .unwrap_or_default()
}

impl RawMarket {
    /// Convert to the engine's market type; `None` when the row is too
    /// malformed to use.
    fn into_market(self) -> Option<Market> {
        let outcomes = decode_string_array(&self.outcomes);
        let outcome_prices: Vec<f64> = decode_string_array(&self.outcome_prices)
            .iter()
            .filter_map(|p| p.parse::<f64>().ok())
            .collect();

        if outcomes.is_empty() || outcomes.len() != outcome_prices.len() {
            return None;
        }

        let volume = self
            .volume_num
            .or_else(|| self.volume.as_deref().and_then(|v| v.parse().ok()))
            .unwrap_or(0.0);

        let series_token = decode_string_array(&self.clob_token_ids).into_iter().next();

        Some(Market {
            id: self.id,
            question: self.question,
            outcomes,
            outcome_prices,
            volume,
            category: self.category.unwrap_or_default(),
            series_token,
        })
    }
}

// ── CLOB wire types ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<HistoryPoint>,
}

#[derive(Debug, Deserialize)]
struct HistoryPoint {
    t: i64,
    p: f64,
}

// ── Client ────────────────────────────────────────────────────────────

/// Async client for Gamma (markets) and CLOB (price history).
#[derive(Debug, Clone)]
pub struct PolymarketClient {
    client: reqwest::Client,
    gamma_base: String,
    clob_base: String,
    history_interval: String,
    history_fidelity_minutes: u32,
    limiter: RateLimiter,
}

impl PolymarketClient {
    pub fn new(config: ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            gamma_base: resolve_base_url(&config.gamma_base, "GAMMA_API_BASE_URL", GAMMA_BASE_URL),
            clob_base: resolve_base_url(&config.clob_base, "CLOB_API_BASE_URL", CLOB_BASE_URL),
            history_interval: config.history_interval,
            history_fidelity_minutes: config.history_fidelity_minutes,
            limiter: RateLimiter::new(),
        }
    }

    /// Fetch active markets above a volume floor.
    ///
    /// Paginates by offset until `max_markets` rows are collected or a
    /// short page signals the end. Malformed rows are skipped, never
    /// fatal.
    pub async fn get_markets(&self, min_volume: f64, max_markets: usize) -> Result<Vec<Market>, Error> {
        let mut markets = Vec::new();
        let mut offset = 0usize;

        while markets.len() < max_markets {
            self.limiter.wait_gamma().await;

            let url = format!("{}/markets", self.gamma_base);
            let resp = self
                .client
                .get(&url)
                .query(&[
                    ("active", "true"),
                    ("closed", "false"),
                    ("limit", &PAGE_SIZE.to_string()),
                    ("offset", &offset.to_string()),
                ])
                .send()
                .await
                .map_err(|e| Error::Http(format_reqwest_error(&e)))?;

            let status = resp.status().as_u16();
            if status != 200 {
                let body = resp.text().await.unwrap_or_default();
                return Err(Error::Api {
                    status,
                    message: body,
                });
            }

            let rows: Vec<RawMarket> = resp
                .json()
                .await
                .map_err(|e| Error::Http(format_reqwest_error(&e)))?;
            let page_len = rows.len();

            let decoded = rows
                .into_iter()
                .filter_map(RawMarket::into_market)
                .filter(|m| m.volume >= min_volume);
            markets.extend(decoded);

            debug!("Fetched page of {} markets (kept: {})", page_len, markets.len());

            if page_len < PAGE_SIZE {
                break;
            }
            offset += PAGE_SIZE;
        }

        markets.truncate(max_markets);
        Ok(markets)
    }

    /// Fetch a single market by id.
    pub async fn get_market(&self, market_id: &str) -> Result<Market, Error> {
        self.limiter.wait_gamma().await;

        let url = format!("{}/markets/{}", self.gamma_base, market_id);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(format_reqwest_error(&e)))?;

        let status = resp.status().as_u16();
        if status == 404 {
            return Err(Error::MarketNotFound(market_id.to_string()));
        }
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let raw: RawMarket = resp
            .json()
            .await
            .map_err(|e| Error::Http(format_reqwest_error(&e)))?;
        raw.into_market()
            .ok_or_else(|| Error::MarketNotFound(market_id.to_string()))
    }

    /// Fetch the price series behind a CLOB token. An empty history is a
    /// valid response — the caller decides whether it is usable.
    pub async fn get_price_history(&self, series_token: &str) -> Result<PriceSeries, Error> {
        self.limiter.wait_clob().await;

        let url = format!("{}/prices-history", self.clob_base);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("market", series_token),
                ("interval", self.history_interval.as_str()),
                ("fidelity", &self.history_fidelity_minutes.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(format_reqwest_error(&e)))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let body: HistoryResponse = resp
            .json()
            .await
            .map_err(|e| Error::Http(format_reqwest_error(&e)))?;

        let mut series: PriceSeries = body
            .history
            .into_iter()
            .map(|point| PricePoint {
                ts: point.t,
                price: point.p,
            })
            .collect();
        series.sort_by_key(|p| p.ts);

        debug!("{}: {} history points", series_token, series.len());
        Ok(series)
    }
}

impl PriceHistoryProvider for PolymarketClient {
    async fn fetch_history(&self, series_token: &str) -> common::Result<PriceSeries> {
        self.get_price_history(series_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_market_decodes_string_encoded_arrays() {
        let raw: RawMarket = serde_json::from_str(
            r#"{
                "id": "12345",
                "question": "Will X happen?",
                "outcomes": "[\"Yes\", \"No\"]",
                "outcomePrices": "[\"0.32\", \"0.68\"]",
                "volumeNum": 250000.5,
                "category": "politics",
                "clobTokenIds": "[\"tok-yes\", \"tok-no\"]"
            }"#,
        )
        .unwrap();

        let market = raw.into_market().expect("well-formed row");
        assert_eq!(market.id, "12345");
        assert_eq!(market.outcomes, vec!["Yes", "No"]);
        assert_eq!(market.outcome_prices, vec![0.32, 0.68]);
        assert_eq!(market.volume, 250000.5);
        assert_eq!(market.series_token.as_deref(), Some("tok-yes"));
    }

    #[test]
    fn test_malformed_row_is_skipped_not_fatal() {
        // Mismatched outcome/price lengths.
        let raw: RawMarket = serde_json::from_str(
            r#"{
                "id": "1",
                "question": "Q",
                "outcomes": "[\"Yes\", \"No\"]",
                "outcomePrices": "[\"0.5\"]"
            }"#,
        )
        .unwrap();
        assert!(raw.into_market().is_none());

        // Unparseable outcomes payload.
        let raw: RawMarket = serde_json::from_str(
            r#"{"id": "2", "question": "Q", "outcomes": "not json"}"#,
        )
        .unwrap();
        assert!(raw.into_market().is_none());
    }

    #[test]
    fn test_volume_string_fallback() {
        let raw: RawMarket = serde_json::from_str(
            r#"{
                "id": "3",
                "question": "Q",
                "outcomes": "[\"Yes\", \"No\"]",
                "outcomePrices": "[\"0.4\", \"0.6\"]",
                "volume": "1234.5"
            }"#,
        )
        .unwrap();
        let market = raw.into_market().unwrap();
        assert_eq!(market.volume, 1234.5);
    }

    #[test]
    fn test_history_response_parses() {
        let body: HistoryResponse = serde_json::from_str(
            r#"{"history": [{"t": 1700000000, "p": 0.42}, {"t": 1700003600, "p": 0.44}]}"#,
        )
        .unwrap();
        assert_eq!(body.history.len(), 2);
        assert_eq!(body.history[0].t, 1_700_000_000);
    }
}
