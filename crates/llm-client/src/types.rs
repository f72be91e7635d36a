//! Wire types for the candidate-generation exchange.
//!
//! Kept separate from the engine's domain types: the wire format is a
//! contract with the model, validated strictly, then converted.

use common::{CandidateRelationship, Direction, Market, TimeLag};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The most candidates a single response may carry.
pub const MAX_CANDIDATES: usize = 5;

/// One market offered to the model as a possible target.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PoolEntry {
    pub id: String,
    pub question: String,
    pub category: String,
    pub volume: f64,
}

/// A candidate-generation request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CandidateRequest {
    pub request_id: Uuid,
    pub trigger_question: String,
    pub simulated_outcome: String,
    pub pool: Vec<PoolEntry>,
}

impl CandidateRequest {
    pub fn from_parts(trigger: &Market, outcome: &str, pool: &[Market]) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            trigger_question: trigger.question.clone(),
            simulated_outcome: outcome.to_string(),
            pool: pool
                .iter()
                .map(|m| PoolEntry {
                    id: m.id.clone(),
                    question: m.question.clone(),
                    category: m.category.clone(),
                    volume: m.volume,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClaimedLag {
    Immediate,
    Hours,
    Days,
    Weeks,
}

impl From<ClaimedLag> for TimeLag {
    fn from(lag: ClaimedLag) -> Self {
        match lag {
            ClaimedLag::Immediate => TimeLag::Immediate,
            ClaimedLag::Hours => TimeLag::Hours,
            ClaimedLag::Days => TimeLag::Days,
            ClaimedLag::Weeks => TimeLag::Weeks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClaimedDirection {
    Increase,
    Decrease,
}

impl From<ClaimedDirection> for Direction {
    fn from(direction: ClaimedDirection) -> Self {
        match direction {
            ClaimedDirection::Increase => Direction::Increase,
            ClaimedDirection::Decrease => Direction::Decrease,
        }
    }
}

/// One claimed relationship as the model states it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CandidateClaim {
    /// Must reference an id from the offered pool.
    pub market_id: String,
    pub reasoning: String,
    pub time_lag: ClaimedLag,
    /// Claimed strength in [0,1].
    pub strength: f64,
    pub direction: ClaimedDirection,
}

/// The full model response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CandidateBatch {
    pub candidates: Vec<CandidateClaim>,
}

impl CandidateBatch {
    /// Convert to engine candidates, capped at `MAX_CANDIDATES`. Pool
    /// membership is checked by the graph builder, not here.
    pub fn into_relationships(self) -> Vec<CandidateRelationship> {
        self.candidates
            .into_iter()
            .take(MAX_CANDIDATES)
            .map(|claim| CandidateRelationship {
                target_market_id: claim.market_id,
                reasoning: claim.reasoning,
                time_lag: claim.time_lag.into(),
                claimed_strength: claim.strength,
                claimed_direction: claim.direction.into(),
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("API request failed: {0}")]
    ApiError(String),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Timeout")]
    Timeout,
    #[error("Schema validation failed: {0}")]
    SchemaValidationFailed(String),
}

/// Reject responses the engine cannot safely use.
pub fn validate_candidate_batch(batch: &CandidateBatch) -> Result<(), GenerationError> {
    for claim in &batch.candidates {
        if claim.market_id.trim().is_empty() {
            return Err(GenerationError::SchemaValidationFailed(
                "empty market_id".into(),
            ));
        }
        if !(0.0..=1.0).contains(&claim.strength) {
            return Err(GenerationError::SchemaValidationFailed(format!(
                "strength out of range for {}: {}",
                claim.market_id, claim.strength
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_claim(id: &str, strength: f64) -> CandidateClaim {
        CandidateClaim {
            market_id: id.into(),
            reasoning: "shared catalyst".into(),
            time_lag: ClaimedLag::Days,
            strength,
            direction: ClaimedDirection::Increase,
        }
    }

    #[test]
    fn test_batch_parses_from_model_json() {
        let batch: CandidateBatch = serde_json::from_str(
            r#"{
                "candidates": [
                    {
                        "market_id": "m1",
                        "reasoning": "same election",
                        "time_lag": "days",
                        "strength": 0.7,
                        "direction": "increase"
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(batch.candidates.len(), 1);
        assert_eq!(batch.candidates[0].time_lag, ClaimedLag::Days);
        assert_eq!(batch.candidates[0].direction, ClaimedDirection::Increase);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<CandidateBatch, _> = serde_json::from_str(
            r#"{"candidates": [], "confidence": 0.9}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_out_of_range_strength() {
        let batch = CandidateBatch {
            candidates: vec![make_claim("m1", 1.5)],
        };
        assert!(validate_candidate_batch(&batch).is_err());

        let batch = CandidateBatch {
            candidates: vec![make_claim("m1", 0.5)],
        };
        assert!(validate_candidate_batch(&batch).is_ok());
    }

    #[test]
    fn test_conversion_caps_candidate_count() {
        let batch = CandidateBatch {
            candidates: (0..8).map(|i| make_claim(&format!("m{}", i), 0.5)).collect(),
        };
        let relationships = batch.into_relationships();
        assert_eq!(relationships.len(), MAX_CANDIDATES);
        assert_eq!(relationships[0].target_market_id, "m0");
        assert_eq!(relationships[0].time_lag, common::TimeLag::Days);
    }
}
