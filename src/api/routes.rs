//! Ingress routes (§6): the five external operations.
//!
//! Router assembly mirrors the teacher's `create_agentic_router` /
//! `create_stewardship_router` (`api/stewardship_routes.rs`) — one
//! `create_triad_router(AppState) -> Router` function wired up in the
//! binary, with CORS/tracing layers applied there, not here.

use axum::extract::{Path, Query, State};
use axum::response::sse::Sse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::sse::{sse_stream, SseEventStream};
use crate::api::state::AppState;
use crate::blocks::Block;
use crate::error::{TriadError, TriadResult};
use crate::job::{JobHandle, JobStatus};
use crate::snapshot::SnapshotRequest;

pub fn create_triad_router(state: AppState) -> Router<()> {
    Router::new()
        .route("/snapshot", post(create_snapshot))
        .route("/blocks-fast", post(enqueue_blocks))
        .route("/blocks/strategy/{snapshot_id}", get(get_strategy))
        .route("/events", get(events_sse))
        .route("/jobs/{job_id}/cancel", post(cancel_job))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct SnapshotResponse {
    snapshot_id: Uuid,
}

/// POST /snapshot
async fn create_snapshot(
    State(state): State<AppState>,
    Json(request): Json<SnapshotRequest>,
) -> TriadResult<Json<SnapshotResponse>> {
    let snapshot_id = state.snapshots.put(request).await?;
    Ok(Json(SnapshotResponse { snapshot_id }))
}

#[derive(Debug, Deserialize)]
struct EnqueueRequest {
    snapshot_id: Uuid,
}

/// POST /blocks-fast — idempotent enqueue + fire-and-forget orchestrator
/// run. Returns immediately with the job handle; progress is observed
/// via `GET /events` and the final artifact via `GET /blocks/strategy`.
async fn enqueue_blocks(
    State(state): State<AppState>,
    Json(request): Json<EnqueueRequest>,
) -> TriadResult<Json<JobHandle>> {
    let (handle, started) = state.jobs.enqueue(request.snapshot_id).await?;

    if started {
        let snapshot = state.snapshots.get(request.snapshot_id).await?;
        let orchestrator = state.orchestrator.clone();
        let job_id = handle.job_id;
        tokio::spawn(async move {
            orchestrator.run(job_id, snapshot).await;
        });
    }

    Ok(Json(handle))
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum StrategyResponse {
    InProgress {
        snapshot_id: Uuid,
        job_id: Uuid,
    },
    Succeeded {
        snapshot_id: Uuid,
        job_id: Uuid,
        strategy: String,
        blocks: Vec<Block>,
    },
}

/// GET /blocks/strategy/:snapshot_id — never exposes a partial artifact
/// for a failed job (§8 scenario 3). `strategy` is the Strategy Artifact's
/// (§3) narrative text; `blocks` is the full rendered set (§6).
async fn get_strategy(
    State(state): State<AppState>,
    Path(snapshot_id): Path<Uuid>,
) -> TriadResult<Json<StrategyResponse>> {
    let job = state.jobs.read_by_snapshot(snapshot_id).await?;

    match job.status {
        JobStatus::Succeeded => {
            let blocks = state.orchestrator.artifacts().get(job.job_id).await?;
            let artifact = state.orchestrator.strategy_artifacts().get(job.job_id).await?;
            Ok(Json(StrategyResponse::Succeeded {
                snapshot_id,
                job_id: job.job_id,
                strategy: artifact.narrative,
                blocks,
            }))
        }
        JobStatus::Failed => Err(TriadError::from_code_message(
            job.error_code.unwrap_or_else(|| "unknown".to_string()),
            job.error_message.unwrap_or_default(),
        )),
        JobStatus::Cancelled => Err(TriadError::Cancelled),
        JobStatus::Pending | JobStatus::InProgress => {
            Ok(Json(StrategyResponse::InProgress { snapshot_id, job_id: job.job_id }))
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    job_id: Uuid,
    last_seen: Option<u64>,
}

/// GET /events?job_id=...&last_seen=... — SSE stream, grounded in
/// `api/stewardship_routes.rs::workbench_sse`. Replays the job's current
/// state before subscribing (§4.10).
async fn events_sse(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> TriadResult<Sse<SseEventStream>> {
    sse_stream((*state.jobs).clone(), state.events, query.job_id, query.last_seen).await
}

/// POST /jobs/:job_id/cancel
async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> TriadResult<Json<serde_json::Value>> {
    state.orchestrator.cancel(job_id).await?;
    Ok(Json(serde_json::json!({"status": "cancel_requested"})))
}
