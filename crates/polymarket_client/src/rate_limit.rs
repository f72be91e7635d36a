//! Rate limiter for Polymarket public endpoints.
//!
//! Gamma and CLOB are separate services with separate budgets, so each
//! gets its own bucket.

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter =
    GovLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>;

/// Dual rate limiter — one bucket per upstream service.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    gamma_limiter: Arc<DirectLimiter>,
    clob_limiter: Arc<DirectLimiter>,
}

impl RateLimiter {
    /// Create with conservative public-tier limits.
    pub fn new() -> Self {
        Self::with_limits(10, 20)
    }

    /// Create with custom per-second limits.
    pub fn with_limits(gamma_per_sec: u32, clob_per_sec: u32) -> Self {
        let gamma_quota = Quota::per_second(NonZeroU32::new(gamma_per_sec).unwrap());
        let clob_quota = Quota::per_second(NonZeroU32::new(clob_per_sec).unwrap());

        Self {
            gamma_limiter: Arc::new(GovLimiter::direct(gamma_quota)),
            clob_limiter: Arc::new(GovLimiter::direct(clob_quota)),
        }
    }

    /// Wait until a Gamma request slot is available.
    pub async fn wait_gamma(&self) {
        self.gamma_limiter.until_ready().await;
    }

    /// Wait until a CLOB request slot is available.
    pub async fn wait_clob(&self) {
        self.clob_limiter.until_ready().await;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
