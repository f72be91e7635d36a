//! Anthropic-backed candidate generation.

use std::time::Duration;

use common::providers::CandidateGenerator;
use common::{CandidateRelationship, Market};
use reqwest::Client;
use serde_json::json;
use tokio::time::sleep;
use tracing::{instrument, warn};

use crate::types::{
    validate_candidate_batch, CandidateBatch, CandidateRequest, GenerationError, MAX_CANDIDATES,
};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, timeout_ms: u64, max_retries: u32) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            api_key,
            model,
            max_retries,
        }
    }

    fn extract_text_content(response_body: &serde_json::Value) -> Result<&str, GenerationError> {
        let content_arr = response_body
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                GenerationError::SchemaValidationFailed("Missing or invalid 'content' field".into())
            })?;

        content_arr
            .iter()
            .find(|item| item["type"] == "text")
            .and_then(|item| item["text"].as_str())
            .ok_or_else(|| GenerationError::SchemaValidationFailed("Missing 'text' content".into()))
    }

    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    pub async fn request_candidates(
        &self,
        request: CandidateRequest,
    ) -> Result<CandidateBatch, GenerationError> {
        let schemars_schema = schemars::schema_for!(CandidateBatch);
        let schema_json =
            serde_json::to_string_pretty(&schemars_schema).map_err(GenerationError::JsonError)?;

        let system_prompt = format!(
            r#"You identify prediction markets whose probabilities would move if a given market outcome occurred.
Given the trigger market, the outcome assumed certain, and a pool of candidate markets, return up to {} candidates.
Only reference market ids from the provided pool. For each candidate state the direction the probability would move, a strength in [0,1], and a time lag.
You must output strictly valid JSON conforming to the schema below.
Do NOT output any markdown blocks or conversational text. JUST the JSON object.

JSON Schema:
{}
"#,
            MAX_CANDIDATES, schema_json
        );

        let user_prompt = json!({
            "task": "propose_affected_markets",
            "trigger_question": &request.trigger_question,
            "simulated_outcome": &request.simulated_outcome,
            "candidate_pool": &request.pool,
        });

        let payload = json!({
            "model": self.model,
            "max_tokens": 1024,
            "system": system_prompt,
            "messages": [
                {
                    "role": "user",
                    "content": serde_json::to_string(&user_prompt)?
                }
            ]
        });

        let mut attempt = 0u32;
        loop {
            let send_result = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("content-type", "application/json")
                .json(&payload)
                .send()
                .await;

            match send_result {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        if status.as_u16() == 429 && attempt < self.max_retries {
                            attempt += 1;
                            sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                            continue;
                        }
                        return Err(GenerationError::HttpStatus {
                            status: status.as_u16(),
                            body,
                        });
                    }

                    let response_body: serde_json::Value = response
                        .json()
                        .await
                        .map_err(|e| GenerationError::ApiError(e.to_string()))?;
                    let text_content = Self::extract_text_content(&response_body)?;

                    // Prompt requests JSON-only, but stay defensive
                    // against occasional wrappers.
                    let json_start = text_content.find('{').unwrap_or(0);
                    let json_end = text_content
                        .rfind('}')
                        .map(|i| i + 1)
                        .unwrap_or(text_content.len());
                    let json_str = &text_content[json_start..json_end];

                    let batch: CandidateBatch =
                        serde_json::from_str(json_str).map_err(GenerationError::JsonError)?;
                    validate_candidate_batch(&batch)?;
                    return Ok(batch);
                }
                Err(e) => {
                    if e.is_timeout() {
                        if attempt < self.max_retries {
                            attempt += 1;
                            sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                            continue;
                        }
                        return Err(GenerationError::Timeout);
                    }
                    if attempt < self.max_retries {
                        attempt += 1;
                        sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                        continue;
                    }
                    return Err(GenerationError::ApiError(e.to_string()));
                }
            }
        }
    }
}

impl CandidateGenerator for AnthropicClient {
    /// A malformed response is zero candidates, not a failed run; only
    /// transport-level failures surface as errors, and the builder treats
    /// those as zero candidates too.
    async fn generate(
        &self,
        trigger: &Market,
        outcome: &str,
        pool: &[Market],
    ) -> common::Result<Vec<CandidateRelationship>> {
        let request = CandidateRequest::from_parts(trigger, outcome, pool);
        match self.request_candidates(request).await {
            Ok(batch) => Ok(batch.into_relationships()),
            Err(e @ GenerationError::JsonError(_))
            | Err(e @ GenerationError::SchemaValidationFailed(_)) => {
                warn!("unusable candidate response for {}: {}", trigger.id, e);
                Ok(Vec::new())
            }
            Err(e) => Err(common::Error::Llm(e.to_string())),
        }
    }
}
