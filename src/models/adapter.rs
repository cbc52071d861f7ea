//! Unified Model Adapter contract (§4.3).
//!
//! Grounded directly in the teacher's `agentic/llm_client.rs` (`LlmClient`
//! trait, `#[async_trait] ... Send + Sync`). The shape here generalizes it
//! from "chat text in/out" to the full `{system, user, constraints, phase,
//! snapshot_id, correlation_id} -> {text, usage, model_id, latency_ms}`
//! contract the spec requires, polymorphic over the provider's capability
//! set. The phase/snapshot/correlation fields exist solely so the provider
//! can emit the §4.3 structured log record.

use async_trait::async_trait;

use crate::error::TriadResult;
use crate::models::types::{ModelRequest, ModelResponse, Role};

#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Issue one call for `role`. Implementations MUST verify the
    /// provider echoed the configured model id back and fail with
    /// `model_mismatch` otherwise — no silent substitution (§4.3).
    async fn call(&self, role: Role, request: ModelRequest) -> TriadResult<ModelResponse>;

    /// The model id this adapter is configured to call.
    fn configured_model_id(&self) -> &str;

    fn provider_name(&self) -> &str;
}
