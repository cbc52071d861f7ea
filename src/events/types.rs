//! Event shapes published on the Event Bus (§4.7).

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::job::Phase;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    PhaseChange { phase: Phase },
    StageComplete { stage: String },
    JobSucceeded,
    JobFailed { code: String, message: String },
    JobCancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobEvent {
    pub job_id: Uuid,
    /// Monotonic per job; lets the SSE endpoint resume after reconnect by
    /// echoing only events with seq > last_seen (§4.7).
    pub seq: u64,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}
