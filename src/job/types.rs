//! Job data model (§3, §4.2).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job status, matching the DB check constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Orchestrator phase, tracked independently of `JobStatus` so progress
/// can be observed mid-flight (§3 Lifecycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    P1,
    P2,
    P3,
    Done,
}

impl Phase {
    /// Short form used in structured logs (§4.3) and SSE payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::P1 => "p1",
            Phase::P2 => "p2",
            Phase::P3 => "p3",
            Phase::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: Uuid,
    pub snapshot_id: Uuid,
    pub status: JobStatus,
    pub attempt: i32,
    pub correlation_id: Uuid,
    pub phase: Phase,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome recorded by `complete()` (§4.2).
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Succeeded,
    Failed { code: String, message: String },
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct JobHandle {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub attempt: i32,
}
