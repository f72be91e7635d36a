//! Narrow seams to the external collaborators.
//!
//! Both collaborators are non-deterministic or network-backed, so they sit
//! behind traits and the deterministic engine is tested against fixtures.

use std::future::Future;

use crate::types::{CandidateRelationship, Market, PriceSeries};
use crate::Result;

/// The external reasoning collaborator: given a trigger market, the
/// simulated outcome, and a pool of candidate markets, returns ranked
/// candidate relationships referencing pool ids.
///
/// Implementations must tolerate their own backend failing; the engine
/// treats any error as "zero candidates for this frontier".
pub trait CandidateGenerator {
    fn generate(
        &self,
        trigger: &Market,
        outcome: &str,
        pool: &[Market],
    ) -> impl Future<Output = Result<Vec<CandidateRelationship>>> + Send;
}

/// The historical-price collaborator: resolves a market's series token to
/// a possibly-empty ordered price series.
pub trait PriceHistoryProvider {
    fn fetch_history(
        &self,
        series_token: &str,
    ) -> impl Future<Output = Result<PriceSeries>> + Send;
}
