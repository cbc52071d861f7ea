//! Persisted block set: the rendered blocks (§3) produced by a succeeded
//! job, distinct from the `strategy_artifacts` table `strategy.rs` owns.
//!
//! One row per job attempt (`job_id` is the attempt-scoped identifier
//! minted by `JobRegistry::enqueue`), so a retried attempt never confuses
//! readers about which blocks belong to which run. Overwrite-on-retry vs.
//! retention of prior attempts is the Open Question resolved in
//! DESIGN.md; this store implements overwrite.

use sqlx::PgPool;
use uuid::Uuid;

use crate::blocks::Block;
use crate::error::{TriadError, TriadResult};

pub struct ArtifactStore {
    pool: PgPool,
}

impl ArtifactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn put(&self, job_id: Uuid, blocks: &[Block]) -> TriadResult<()> {
        let payload = serde_json::to_value(blocks)
            .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO blocks (job_id, blocks, created_at)
            VALUES ($1, $2, now())
            ON CONFLICT (job_id) DO UPDATE SET blocks = EXCLUDED.blocks, created_at = now()
            "#,
        )
        .bind(job_id)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?;

        Ok(())
    }

    /// Only a succeeded job's blocks are ever returned by the caller —
    /// this store just reads whatever is on record for a job id.
    pub async fn get(&self, job_id: Uuid) -> TriadResult<Vec<Block>> {
        let row: (serde_json::Value,) =
            sqlx::query_as("SELECT blocks FROM blocks WHERE job_id = $1")
                .bind(job_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?
                .ok_or_else(|| TriadError::NotFound(format!("artifact for job {job_id}")))?;

        serde_json::from_value(row.0).map_err(|e| TriadError::StorageUnavailable(e.to_string()))
    }
}
