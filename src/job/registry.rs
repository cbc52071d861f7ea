//! Job Registry (C2). See §4.2.
//!
//! Idempotent per-snapshot upsert, single-writer terminal transitions
//! enforced by a `WHERE status = $expected` predicate, and
//! exponential-backoff retry on transient persistence failure — the same
//! "enforce the invariant in the SQL predicate, not just in application
//! code" idiom as the teacher's advisory-lock comments in
//! `database/locks.rs`.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{TriadError, TriadResult};
use crate::job::types::{Job, JobHandle, JobOutcome, JobStatus, Phase};

const MAX_RETRIES: u32 = 3;

#[derive(Clone)]
pub struct JobRegistry {
    pool: PgPool,
    retry_cooldown: Duration,
}

impl JobRegistry {
    pub fn new(pool: PgPool, retry_cooldown: Duration) -> Self {
        Self {
            pool,
            retry_cooldown,
        }
    }

    /// Idempotent enqueue. If an existing job for `snapshot_id` is
    /// terminal and older than the retry cooldown, starts a new attempt
    /// (increments `attempt`, resets status to `pending`). Otherwise
    /// returns the existing handle unchanged — this is what makes
    /// concurrent duplicate submissions converge on one job row (§8).
    ///
    /// The second element of the tuple is `true` only when this call
    /// actually started a new attempt (fresh insert or stale-terminal
    /// retry) — the caller uses it to decide whether to spawn the
    /// orchestrator run, so a duplicate concurrent call that observed an
    /// already-pending row never double-runs the same attempt.
    pub async fn enqueue(&self, snapshot_id: Uuid) -> TriadResult<(JobHandle, bool)> {
        self.with_retry(|| self.enqueue_once(snapshot_id)).await
    }

    async fn enqueue_once(&self, snapshot_id: Uuid) -> TriadResult<(JobHandle, bool)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?;

        let existing = sqlx::query_as::<_, JobRow>(
            "SELECT * FROM jobs WHERE snapshot_id = $1 FOR UPDATE",
        )
        .bind(snapshot_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?;

        let (handle, started) = match existing {
            None => {
                let job_id = Uuid::new_v4();
                let correlation_id = Uuid::new_v4();
                let now = Utc::now();
                sqlx::query(
                    r#"
                    INSERT INTO jobs
                        (job_id, snapshot_id, status, attempt, correlation_id, phase,
                         created_at, updated_at)
                    VALUES ($1, $2, $3, 1, $4, $5, $6, $6)
                    "#,
                )
                .bind(job_id)
                .bind(snapshot_id)
                .bind(JobStatus::Pending)
                .bind(correlation_id)
                .bind(Phase::Idle)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?;

                (
                    JobHandle {
                        job_id,
                        status: JobStatus::Pending,
                        attempt: 1,
                    },
                    true,
                )
            }
            Some(row) => {
                let stale_terminal = row.status.is_terminal()
                    && Utc::now().signed_duration_since(row.updated_at)
                        > chrono::Duration::from_std(self.retry_cooldown).unwrap_or_default();

                if stale_terminal {
                    let new_attempt = row.attempt + 1;
                    sqlx::query(
                        r#"
                        UPDATE jobs
                        SET status = $1, attempt = $2, phase = $3, error_code = NULL,
                            error_message = NULL, updated_at = $4
                        WHERE job_id = $5
                        "#,
                    )
                    .bind(JobStatus::Pending)
                    .bind(new_attempt)
                    .bind(Phase::Idle)
                    .bind(Utc::now())
                    .bind(row.job_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?;

                    (
                        JobHandle {
                            job_id: row.job_id,
                            status: JobStatus::Pending,
                            attempt: new_attempt,
                        },
                        true,
                    )
                } else {
                    // Not terminal, or terminal but within cooldown: return
                    // the existing handle unchanged (idempotency, §3).
                    (
                        JobHandle {
                            job_id: row.job_id,
                            status: row.status,
                            attempt: row.attempt,
                        },
                        false,
                    )
                }
            }
        };

        tx.commit()
            .await
            .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?;

        Ok((handle, started))
    }

    /// Advance to a new phase. Guarded by the current status being
    /// `in_progress` (or `pending`, for the p1 transition).
    pub async fn advance(&self, job_id: Uuid, phase: Phase) -> TriadResult<()> {
        self.with_retry(|| async {
            let result = sqlx::query(
                r#"
                UPDATE jobs
                SET phase = $1, status = 'in_progress', updated_at = $2
                WHERE job_id = $3 AND status IN ('pending', 'in_progress')
                "#,
            )
            .bind(phase)
            .bind(Utc::now())
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?;

            if result.rows_affected() == 0 {
                return Err(TriadError::StorageUnavailable(format!(
                    "job {job_id} is not in an advanceable state"
                )));
            }
            Ok(())
        })
        .await
    }

    /// Terminal transition. Single-writer: only succeeds if the job is
    /// still `in_progress` or `pending` — a second caller racing to
    /// complete the same job is a no-op, not a double-write.
    pub async fn complete(&self, job_id: Uuid, outcome: JobOutcome) -> TriadResult<()> {
        self.with_retry(|| async {
            let (status, phase, code, message): (JobStatus, Phase, Option<String>, Option<String>) =
                match &outcome {
                    JobOutcome::Succeeded => (JobStatus::Succeeded, Phase::Done, None, None),
                    JobOutcome::Failed { code, message } => {
                        (JobStatus::Failed, Phase::Done, Some(code.clone()), Some(message.clone()))
                    }
                    JobOutcome::Cancelled => (JobStatus::Cancelled, Phase::Done, None, None),
                };

            let result = sqlx::query(
                r#"
                UPDATE jobs
                SET status = $1, phase = $2, error_code = $3, error_message = $4, updated_at = $5
                WHERE job_id = $6 AND status IN ('pending', 'in_progress')
                "#,
            )
            .bind(status)
            .bind(phase)
            .bind(&code)
            .bind(&message)
            .bind(Utc::now())
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?;

            if result.rows_affected() == 0 {
                tracing::debug!(%job_id, "complete() no-op: job already terminal");
            }
            Ok(())
        })
        .await
    }

    pub async fn read(&self, job_id: Uuid) -> TriadResult<Job> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE job_id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?
            .ok_or_else(|| TriadError::NotFound(format!("job {job_id}")))?;
        Ok(row.into())
    }

    /// Looks up the current job for a snapshot (§6 `GET /blocks/strategy/:snapshot_id`).
    pub async fn read_by_snapshot(&self, snapshot_id: Uuid) -> TriadResult<Job> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE snapshot_id = $1")
            .bind(snapshot_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?
            .ok_or_else(|| TriadError::NotFound(format!("job for snapshot {snapshot_id}")))?;
        Ok(row.into())
    }

    /// Exponential backoff: 3 attempts, doubling from 50ms. Unrecoverable
    /// failure surfaces `storage_unavailable` (§4.2).
    async fn with_retry<F, Fut, T>(&self, mut op: F) -> TriadResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = TriadResult<T>>,
    {
        let mut delay = Duration::from_millis(50);
        let mut last_err = None;
        for attempt in 0..MAX_RETRIES {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "job registry operation failed, retrying");
                    last_err = Some(e);
                    if attempt + 1 < MAX_RETRIES {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }
        Err(last_err.unwrap_or(TriadError::StorageUnavailable("retry loop exhausted".into())))
    }
}

#[derive(sqlx::FromRow)]
struct JobRow {
    job_id: Uuid,
    snapshot_id: Uuid,
    status: JobStatus,
    attempt: i32,
    correlation_id: Uuid,
    phase: Phase,
    error_code: Option<String>,
    error_message: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            job_id: row.job_id,
            snapshot_id: row.snapshot_id,
            status: row.status,
            attempt: row.attempt,
            correlation_id: row.correlation_id,
            phase: row.phase,
            error_code: row.error_code,
            error_message: row.error_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
