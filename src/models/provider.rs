//! A single HTTP-backed model provider, one instance per TRIAD role.
//!
//! Mirrors the teacher's `agentic/anthropic_client.rs`: a `reqwest::Client`
//! plus an API key and model id, one `call_api` method, a model-id echo
//! check before trusting the response. Every call emits the structured
//! log record required by §4.3.

use std::time::Instant;

use serde::Deserialize;

use crate::error::{TriadError, TriadResult};
use crate::models::adapter::ModelAdapter;
use crate::models::types::{ModelRequest, ModelResponse, ModelUsage, ReasoningEffort, Role};

pub struct HttpModelProvider {
    provider_name: String,
    model_id: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl HttpModelProvider {
    pub fn new(provider_name: String, model_id: String, api_key: String, base_url: String) -> Self {
        Self {
            provider_name,
            model_id,
            api_key,
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl ModelAdapter for HttpModelProvider {
    async fn call(&self, role: Role, request: ModelRequest) -> TriadResult<ModelResponse> {
        let started = Instant::now();

        let effort_param = match request.constraints.reasoning_effort {
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
            ReasoningEffort::Max => "max",
        };

        let body = serde_json::json!({
            "model": self.model_id,
            "system": request.system,
            "messages": [{"role": "user", "content": request.user}],
            "reasoning_effort": effort_param,
            "response_format": if request.constraints.json_mode { "json" } else { "text" },
        });

        let send = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send();

        let response = tokio::time::timeout(request.constraints.timeout, send)
            .await
            .map_err(|_| role_timeout_error(role, "request timed out"))?
            .map_err(|e| role_timeout_error(role, &e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS
            || response.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(TriadError::PlannerThrottled);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            return Err(role_failure_error(
                role,
                &format!("provider returned {status}: {body_text}"),
            ));
        }

        #[derive(Deserialize)]
        struct ApiResponse {
            text: String,
            model: String,
            input_tokens: u32,
            output_tokens: u32,
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| role_failure_error(role, &e.to_string()))?;

        if parsed.model != self.model_id {
            return Err(TriadError::ModelMismatch {
                expected: self.model_id.clone(),
                actual: parsed.model,
            });
        }

        let latency_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            phase = request.phase.as_str(),
            role = role.as_str(),
            model_id = %self.model_id,
            reasoning_effort = effort_param,
            snapshot_id = %request.snapshot_id,
            correlation_id = %request.correlation_id,
            latency_ms,
            "model adapter call completed"
        );

        Ok(ModelResponse {
            text: parsed.text,
            usage: ModelUsage {
                input_tokens: parsed.input_tokens,
                output_tokens: parsed.output_tokens,
            },
            model_id: parsed.model,
            latency_ms,
        })
    }

    fn configured_model_id(&self) -> &str {
        &self.model_id
    }

    fn provider_name(&self) -> &str {
        &self.provider_name
    }
}

fn role_timeout_error(role: Role, message: &str) -> TriadError {
    match role {
        Role::Strategist => TriadError::StrategistFailed(message.to_string()),
        Role::Planner => TriadError::PlannerFailed(message.to_string()),
        Role::Validator => TriadError::ValidatorFailed(message.to_string()),
    }
}

fn role_failure_error(role: Role, message: &str) -> TriadError {
    role_timeout_error(role, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_failure_maps_to_typed_variant() {
        assert_eq!(role_failure_error(Role::Strategist, "x").code(), "strategist_failed");
        assert_eq!(role_failure_error(Role::Planner, "x").code(), "planner_failed");
        assert_eq!(role_failure_error(Role::Validator, "x").code(), "validator_failed");
    }
}
