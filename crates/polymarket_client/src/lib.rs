//! REST client for Polymarket public data.
//!
//! Covers: market discovery via the Gamma API (the candidate pool) and
//! price history via the CLOB prices-history endpoint. Read-only and
//! unauthenticated; all requests are rate-limited.

pub mod cache;
pub mod rate_limit;
pub mod rest;

pub use cache::{new_market_cache, MarketCache, MarketCacheEntry};
pub use rate_limit::RateLimiter;
pub use rest::{ClientConfig, PolymarketClient};
