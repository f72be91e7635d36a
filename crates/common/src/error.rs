//! Unified error type for the simulation engine and its clients.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error (status={status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Outcome '{outcome}' not found on market {market_id}")]
    UnknownOutcome { market_id: String, outcome: String },

    #[error("Market not found: {0}")]
    MarketNotFound(String),

    #[error("Simulation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
