//! Model Adapter Layer shapes (§4.3).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::job::Phase;

/// The three TRIAD roles. Each is wired to exactly one provider handle at
/// startup — no fallback chain inside the adapter (§4.3, Design Notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Strategist,
    Planner,
    Validator,
}

impl Role {
    pub fn timeout_budget(self) -> Duration {
        match self {
            Role::Strategist => Duration::from_secs(12),
            Role::Planner => Duration::from_secs(45),
            Role::Validator => Duration::from_secs(15),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Strategist => "strategist",
            Role::Planner => "planner",
            Role::Validator => "validator",
        }
    }
}

/// Adapter-level scalar representing the provider's depth-of-reasoning
/// dial. Not applicable to every role (Strategist uses it; some provider
/// dialects ignore it for chat-only calls).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
    Max,
}

#[derive(Debug, Clone)]
pub struct ModelConstraints {
    pub reasoning_effort: ReasoningEffort,
    pub json_mode: bool,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system: String,
    pub user: String,
    pub constraints: ModelConstraints,
    /// Orchestrator phase this call belongs to (p1/p2/p3), carried for the
    /// §4.3 structured log record — distinct from `role`, since a role can
    /// be called from more than one phase.
    pub phase: Phase,
    pub snapshot_id: Uuid,
    pub correlation_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub text: String,
    pub usage: ModelUsage,
    pub model_id: String,
    pub latency_ms: u64,
}
