//! LLM-backed candidate-relationship generation.
//!
//! The reasoning backend proposes which markets a trigger outcome could
//! move, with a claimed direction, strength, and time lag. Nothing it
//! returns is trusted: responses are schema-validated here and
//! statistically validated downstream.

pub mod client;
pub mod types;

pub use client::AnthropicClient;
pub use types::{
    validate_candidate_batch, CandidateBatch, CandidateClaim, CandidateRequest, ClaimedDirection,
    ClaimedLag, GenerationError, PoolEntry,
};
