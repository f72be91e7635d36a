//! Per-run correlation cache.
//!
//! Keyed by normalized market pair so (a,b) and (b,a) share an entry.
//! The cache is an explicit value handed to the validator — nothing
//! global survives across runs — with TTL staleness and a size bound.

use std::time::{Duration, Instant};

use common::{CorrelationResult, SimulationConfig};
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct CacheEntry {
    result: CorrelationResult,
    inserted_at: Instant,
}

/// Thread-safe TTL cache for pairwise correlations.
#[derive(Debug)]
pub struct CorrelationCache {
    inner: DashMap<(String, String), CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl CorrelationCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: DashMap::new(),
            ttl,
            max_entries,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            Duration::from_secs(config.correlation_cache_ttl_secs),
            config.correlation_cache_max_entries,
        )
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }

    /// Fetch a fresh entry; stale entries are evicted on read.
    pub fn get(&self, a: &str, b: &str) -> Option<CorrelationResult> {
        let key = Self::key(a, b);
        if let Some(entry) = self.inner.get(&key) {
            if entry.inserted_at.elapsed() <= self.ttl {
                return Some(entry.result);
            }
        }
        self.inner.remove(&key);
        None
    }

    /// Insert a computed correlation. When the cache is over its bound,
    /// stale entries are swept first; if it is still full the insert is
    /// skipped — recomputing is cheaper than unbounded growth.
    pub fn insert(&self, a: &str, b: &str, result: CorrelationResult) {
        if self.inner.len() >= self.max_entries {
            let ttl = self.ttl;
            self.inner.retain(|_, e| e.inserted_at.elapsed() <= ttl);
            if self.inner.len() >= self.max_entries {
                return;
            }
        }
        self.inner.insert(
            Self::key(a, b),
            CacheEntry {
                result,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(r: f64) -> CorrelationResult {
        CorrelationResult {
            coefficient: r,
            sample_size: 20,
            confidence: 0.5,
        }
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        let cache = CorrelationCache::new(Duration::from_secs(60), 16);
        cache.insert("b", "a", make_result(0.4));
        let hit = cache.get("a", "b").expect("entry should be shared");
        assert_eq!(hit.coefficient, 0.4);
    }

    #[test]
    fn test_expired_entries_are_evicted_on_read() {
        let cache = CorrelationCache::new(Duration::from_secs(0), 16);
        cache.insert("a", "b", make_result(0.4));
        assert!(cache.get("a", "b").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_skipped_when_full_of_fresh_entries() {
        let cache = CorrelationCache::new(Duration::from_secs(60), 2);
        cache.insert("a", "b", make_result(0.1));
        cache.insert("a", "c", make_result(0.2));
        cache.insert("a", "d", make_result(0.3));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a", "d").is_none());
    }
}
