//! Phase 1 / Phase 2 integration tests against fake model adapters — no
//! network, no database. Grounded in scenario properties from §8: a
//! missing optional input degrades, a missing required input is fatal.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use triad_core::error::{TriadError, TriadResult};
use triad_core::models::{ModelResponse, ModelUsage, Role, RoleHandles};
use triad_core::orchestrator::{phase1, phase2};
use triad_core::snapshot::{Coordinates, ResolvedLocation, Snapshot};

/// Always succeeds with a fixed reply, tagging the role into the text so
/// assertions can tell which call produced it.
struct EchoAdapter {
    model_id: String,
}

#[async_trait]
impl triad_core::models::ModelAdapter for EchoAdapter {
    async fn call(&self, role: Role, request: triad_core::models::ModelRequest) -> TriadResult<ModelResponse> {
        Ok(ModelResponse {
            text: format!("{}:{}", role.as_str(), request.user.len()),
            usage: ModelUsage { input_tokens: 10, output_tokens: 10 },
            model_id: self.model_id.clone(),
            latency_ms: 5,
        })
    }

    fn configured_model_id(&self) -> &str {
        &self.model_id
    }

    fn provider_name(&self) -> &str {
        "echo"
    }
}

/// Fails every call after an optional warm-up count of successes, used to
/// simulate a role going dark mid-run.
struct FailingAdapter {
    calls: AtomicU32,
    fail_from: u32,
}

#[async_trait]
impl triad_core::models::ModelAdapter for FailingAdapter {
    async fn call(&self, _role: Role, _request: triad_core::models::ModelRequest) -> TriadResult<ModelResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n >= self.fail_from {
            Err(TriadError::StrategistFailed("provider unavailable".to_string()))
        } else {
            Ok(ModelResponse {
                text: "ok".to_string(),
                usage: ModelUsage { input_tokens: 1, output_tokens: 1 },
                model_id: "fail-v1".to_string(),
                latency_ms: 1,
            })
        }
    }

    fn configured_model_id(&self) -> &str {
        "fail-v1"
    }

    fn provider_name(&self) -> &str {
        "failing"
    }
}

fn snapshot() -> Snapshot {
    Snapshot {
        snapshot_id: Uuid::new_v4(),
        coordinates: Coordinates::new(32.8968, -97.038).unwrap(),
        captured_at: Utc.with_ymd_and_hms(2026, 1, 16, 14, 0, 0).unwrap(),
        resolved: ResolvedLocation {
            timezone: "America/Chicago".to_string(),
            city: Some("Fort Worth".to_string()),
            region: Some("TX".to_string()),
            country: "US".to_string(),
            formatted_address: "Fort Worth, TX".to_string(),
        },
        weather: None,
        device_id: None,
    }
}

fn echo_handles() -> RoleHandles {
    RoleHandles {
        strategist: Arc::new(EchoAdapter { model_id: "strategist-v1".to_string() }),
        planner: Arc::new(EchoAdapter { model_id: "planner-v1".to_string() }),
        validator: Arc::new(EchoAdapter { model_id: "validator-v1".to_string() }),
    }
}

#[tokio::test]
async fn phase1_succeeds_with_narrative_and_briefing() {
    let models = echo_handles();
    let output = phase1::execute(&models, &snapshot(), Uuid::new_v4(), Duration::from_secs(5)).await.unwrap();
    assert!(output.narrative.starts_with("strategist:"));
    assert!(output.briefing.is_some());
    assert!(output.holiday.is_some());
}

#[tokio::test]
async fn phase1_degrades_when_briefer_fails_but_strategist_succeeds() {
    // The strategist handle serves both the narrative and briefing calls
    // (§4.6: "an additional invocation with the Strategist role configured
    // for briefing"). Failing from call 1 lets the first call (narrative)
    // succeed and the second (briefing) fail.
    let models = RoleHandles {
        strategist: Arc::new(FailingAdapter { calls: AtomicU32::new(0), fail_from: 1 }),
        planner: Arc::new(EchoAdapter { model_id: "planner-v1".to_string() }),
        validator: Arc::new(EchoAdapter { model_id: "validator-v1".to_string() }),
    };
    let output = phase1::execute(&models, &snapshot(), Uuid::new_v4(), Duration::from_secs(5)).await.unwrap();
    assert_eq!(output.narrative, "ok");
    assert!(output.briefing.is_none());
}

#[tokio::test]
async fn phase1_fails_when_strategist_never_succeeds() {
    let models = RoleHandles {
        strategist: Arc::new(FailingAdapter { calls: AtomicU32::new(0), fail_from: 0 }),
        planner: Arc::new(EchoAdapter { model_id: "planner-v1".to_string() }),
        validator: Arc::new(EchoAdapter { model_id: "validator-v1".to_string() }),
    };
    let err = phase1::execute(&models, &snapshot(), Uuid::new_v4(), Duration::from_secs(5)).await.unwrap_err();
    assert_eq!(err.code(), "strategist_failed");
}

#[tokio::test]
async fn phase2_succeeds_with_both_horizons() {
    let models = echo_handles();
    let phase1_output = phase1::execute(&models, &snapshot(), Uuid::new_v4(), Duration::from_secs(5)).await.unwrap();
    let output = phase2::execute(&models, &phase1_output, snapshot().snapshot_id, Uuid::new_v4(), Duration::from_secs(5)).await.unwrap();
    assert!(!output.daily.is_empty());
    assert!(!output.immediate.is_empty());
}

#[tokio::test]
async fn phase2_fails_when_either_consolidator_fails() {
    // Unlike phase 1, phase 2 has no degraded path: both calls are
    // required, so failing the planner handle at all fails the phase.
    let strategist_models = echo_handles();
    let phase1_output =
        phase1::execute(&strategist_models, &snapshot(), Uuid::new_v4(), Duration::from_secs(5)).await.unwrap();

    let models = RoleHandles {
        strategist: Arc::new(EchoAdapter { model_id: "strategist-v1".to_string() }),
        planner: Arc::new(FailingAdapter { calls: AtomicU32::new(0), fail_from: 0 }),
        validator: Arc::new(EchoAdapter { model_id: "validator-v1".to_string() }),
    };
    let err = phase2::execute(&models, &phase1_output, snapshot().snapshot_id, Uuid::new_v4(), Duration::from_secs(5)).await.unwrap_err();
    assert_eq!(err.code(), "strategist_failed");
}
