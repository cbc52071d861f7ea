//! Phase 2 — consolidation (§4.6, fan-out = 2).
//!
//! Two Planner-role calls over Phase 1 outputs: a "daily" horizon and an
//! "immediate" (next 2 hours) horizon. Both are required — unlike Phase
//! 1, there is no degraded path here.

use std::time::Duration;

use uuid::Uuid;

use crate::error::TriadResult;
use crate::job::Phase;
use crate::models::{ModelConstraints, ModelRequest, ReasoningEffort, Role, RoleHandles};
use crate::orchestrator::phase1::Phase1Output;

/// Versions the consolidator prompt shape (§3 Strategy Artifact's
/// "prompt version" attribute). Bump when `consolidator_request`'s
/// system/user template changes meaning.
const CONSOLIDATOR_PROMPT_VERSION: &str = "consolidator-v1";

/// A stable, human-readable summary of the call's sampling knobs, for the
/// Strategy Artifact's "model params fingerprint" attribute.
fn params_fingerprint(constraints: &ModelConstraints) -> String {
    format!(
        "effort={:?},json_mode={}",
        constraints.reasoning_effort, constraints.json_mode
    )
}

#[derive(Debug, Clone)]
pub struct Phase2Output {
    pub daily: String,
    pub immediate: String,
    /// The "strategy for now" narrative (§3) — the immediate-horizon
    /// consolidation, since that's the text surfaced as the job's
    /// Strategy Artifact.
    pub narrative_model_id: String,
    pub narrative_params_fingerprint: String,
    pub narrative_prompt_version: String,
    pub narrative_latency_ms: u64,
}

fn consolidator_request(
    phase1: &Phase1Output,
    horizon: &str,
    snapshot_id: Uuid,
    correlation_id: Uuid,
) -> ModelRequest {
    let briefing = phase1.briefing.as_deref().unwrap_or("no briefing available");
    let holiday = phase1
        .holiday
        .as_ref()
        .and_then(|h| h.name.as_deref())
        .unwrap_or("not a holiday");

    ModelRequest {
        system: format!("Consolidate a {horizon}-horizon driving plan from the inputs below."),
        user: format!(
            "Narrative: {}\nBriefing: {}\nHoliday: {}",
            phase1.narrative, briefing, holiday
        ),
        constraints: ModelConstraints {
            reasoning_effort: ReasoningEffort::High,
            json_mode: false,
            timeout: Role::Planner.timeout_budget(),
        },
        phase: Phase::P2,
        snapshot_id,
        correlation_id,
    }
}

pub async fn execute(
    models: &RoleHandles,
    phase1: &Phase1Output,
    snapshot_id: Uuid,
    correlation_id: Uuid,
    deadline: Duration,
) -> TriadResult<Phase2Output> {
    let immediate_request =
        consolidator_request(phase1, "immediate (next 2 hours)", snapshot_id, correlation_id);
    let immediate_fingerprint = params_fingerprint(&immediate_request.constraints);

    let daily_fut = models
        .planner
        .call(Role::Planner, consolidator_request(phase1, "daily", snapshot_id, correlation_id));
    let immediate_fut = models.planner.call(Role::Planner, immediate_request);

    let (daily, immediate) = tokio::time::timeout(deadline, async {
        tokio::try_join!(daily_fut, immediate_fut)
    })
    .await
    .map_err(|_| crate::error::TriadError::PlannerFailed("phase 2 deadline exceeded".to_string()))??;

    Ok(Phase2Output {
        daily: daily.text,
        immediate: immediate.text,
        narrative_model_id: immediate.model_id,
        narrative_params_fingerprint: immediate_fingerprint,
        narrative_prompt_version: CONSOLIDATOR_PROMPT_VERSION.to_string(),
        narrative_latency_ms: immediate.latency_ms,
    })
}
