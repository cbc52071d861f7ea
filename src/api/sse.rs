//! SSE transport for job progress (C10). See §4.10.
//!
//! Grounded directly in `api/stewardship_routes.rs::workbench_sse`: a
//! `BroadcastStream` over the per-job channel, a 15s keep-alive ping, and
//! lagged subscribers skipped rather than erroring the stream. Adds
//! last-event-id resume by filtering on `JobEvent.seq` (§4.7), and
//! replay-on-connect (§4.10): a client attaching mid-job gets the job's
//! current state as a synthetic first event before the live stream, since
//! the bounded broadcast channel (C7) has already dropped anything
//! published before it subscribed.

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::error::TriadResult;
use crate::events::EventBus;
use crate::job::{Job, JobRegistry};

pub type SseEventStream = std::pin::Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;

/// The job's current state at connect time, shaped the way a `PhaseChange`
/// event reads so clients don't need a separate parser for it.
#[derive(serde::Serialize)]
struct JobSnapshotEvent<'a> {
    job_id: Uuid,
    phase: crate::job::Phase,
    attempt: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    status: &'a str,
}

fn replay_event(job: &Job) -> Event {
    let snapshot = JobSnapshotEvent {
        job_id: job.job_id,
        phase: job.phase,
        attempt: job.attempt,
        created_at: job.created_at,
        updated_at: job.updated_at,
        status: match job.status {
            crate::job::JobStatus::Pending => "pending",
            crate::job::JobStatus::InProgress => "in_progress",
            crate::job::JobStatus::Succeeded => "succeeded",
            crate::job::JobStatus::Failed => "failed",
            crate::job::JobStatus::Cancelled => "cancelled",
        },
    };
    let json = serde_json::to_string(&snapshot).unwrap_or_default();
    Event::default().event("job_snapshot").data(json)
}

pub async fn sse_stream(
    registry: JobRegistry,
    events: EventBus,
    job_id: Uuid,
    last_seen: Option<u64>,
) -> TriadResult<Sse<SseEventStream>> {
    let job = registry.read(job_id).await?;
    let rx = events.subscribe(job_id).await;
    let last_seen = last_seen.unwrap_or(0);

    let replay = tokio_stream::once(Ok(replay_event(&job)));

    let live = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if event.seq > last_seen => {
            let json = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().id(event.seq.to_string()).event("job").data(json)))
        }
        Ok(_) => None,
        Err(_) => None, // lagged subscriber: skip the gap, don't error the stream
    });

    let stream = replay.chain(live);

    Ok(Sse::new(Box::pin(stream) as SseEventStream).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("ping"),
    ))
}
