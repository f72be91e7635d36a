//! In-memory market cache.
//!
//! Uses `DashMap` for lock-free concurrent reads; the per-candidate
//! validation fan-out only reads.

use common::Market;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;

/// A cached market with staleness tracking.
#[derive(Debug, Clone)]
pub struct MarketCacheEntry {
    pub market: Market,
    pub updated_at: Instant,
}

impl MarketCacheEntry {
    pub fn is_stale(&self, max_age_secs: u64) -> bool {
        self.updated_at.elapsed().as_secs() > max_age_secs
    }
}

/// Thread-safe market cache keyed by market id.
pub type MarketCache = Arc<DashMap<String, MarketCacheEntry>>;

/// Create a new empty MarketCache.
pub fn new_market_cache() -> MarketCache {
    Arc::new(DashMap::new())
}
