//! Strategy Artifact (§3): the narrative text produced by Phase 2, with
//! enough provenance (model id, params fingerprint, prompt version,
//! latency) to explain why a given strategy was shown. Persisted to its
//! own `strategy_artifacts` table, separate from the `blocks` table C8
//! assembles — the two are read together only once a job succeeds.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{TriadError, TriadResult};
use crate::orchestrator::phase2::Phase2Output;

#[derive(Debug, Clone)]
pub struct StrategyArtifact {
    pub narrative: String,
    pub model_id: String,
    pub params_fingerprint: String,
    pub prompt_version: String,
    pub latency_ms: u64,
}

impl StrategyArtifact {
    /// The Strategy Artifact is the "strategy for now" — Phase 2's
    /// immediate-horizon consolidation — carrying that call's provenance.
    pub fn from_phase2(phase2: &Phase2Output) -> Self {
        Self {
            narrative: phase2.immediate.clone(),
            model_id: phase2.narrative_model_id.clone(),
            params_fingerprint: phase2.narrative_params_fingerprint.clone(),
            prompt_version: phase2.narrative_prompt_version.clone(),
            latency_ms: phase2.narrative_latency_ms,
        }
    }
}

pub struct StrategyArtifactStore {
    pool: PgPool,
}

impl StrategyArtifactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Same overwrite-on-retry semantics as `ArtifactStore::put` (§9 Open
    /// Question (a)): one row per job attempt, replaced if the attempt
    /// re-runs Phase 2.
    pub async fn put(&self, job_id: Uuid, artifact: &StrategyArtifact) -> TriadResult<()> {
        sqlx::query(
            r#"
            INSERT INTO strategy_artifacts
                (job_id, narrative, model_id, params_fingerprint, prompt_version, latency_ms, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, now())
            ON CONFLICT (job_id) DO UPDATE SET
                narrative = EXCLUDED.narrative,
                model_id = EXCLUDED.model_id,
                params_fingerprint = EXCLUDED.params_fingerprint,
                prompt_version = EXCLUDED.prompt_version,
                latency_ms = EXCLUDED.latency_ms,
                created_at = now()
            "#,
        )
        .bind(job_id)
        .bind(&artifact.narrative)
        .bind(&artifact.model_id)
        .bind(&artifact.params_fingerprint)
        .bind(&artifact.prompt_version)
        .bind(artifact.latency_ms as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?;

        Ok(())
    }

    pub async fn get(&self, job_id: Uuid) -> TriadResult<StrategyArtifact> {
        let row: (String, String, String, String, i64) = sqlx::query_as(
            "SELECT narrative, model_id, params_fingerprint, prompt_version, latency_ms \
             FROM strategy_artifacts WHERE job_id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?
        .ok_or_else(|| TriadError::NotFound(format!("strategy artifact for job {job_id}")))?;

        Ok(StrategyArtifact {
            narrative: row.0,
            model_id: row.1,
            params_fingerprint: row.2,
            prompt_version: row.3,
            latency_ms: row.4 as u64,
        })
    }
}
