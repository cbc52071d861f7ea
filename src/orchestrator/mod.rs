//! TRIAD Orchestrator (C6). See §4.6.
//!
//! Drives one job through `idle -> p1 -> p2 -> p3 -> done`, no retries
//! within a phase. Cancellation is cooperative via a per-job
//! `tokio_util::sync::CancellationToken`, checked with `tokio::select!`
//! at every phase boundary — the structured-concurrency idiom this pack
//! uses in place of the teacher's database-advisory-lock serialization
//! (`database/locks.rs`). A total budget wraps the whole run.

pub mod artifact;
pub mod phase1;
pub mod phase2;
pub mod phase3;
pub mod strategy;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::blocks::{assemble, Block};
use crate::catalog::VenueCatalog;
use crate::enrichment::Enrichers;
use crate::error::{TriadError, TriadResult};
use crate::events::{EventBus, EventKind};
use crate::job::{JobOutcome, JobRegistry, Phase};
use crate::models::RoleHandles;
use crate::snapshot::Snapshot;
use crate::validation::validate_artifact;

pub use artifact::ArtifactStore;
pub use strategy::{StrategyArtifact, StrategyArtifactStore};

pub struct PhaseDeadlines {
    pub phase1: Duration,
    pub phase2: Duration,
    pub phase3: Duration,
    pub total_budget: Duration,
}

pub struct Orchestrator {
    registry: JobRegistry,
    events: EventBus,
    models: RoleHandles,
    enrichers: Enrichers,
    catalog: VenueCatalog,
    artifacts: ArtifactStore,
    strategy_artifacts: StrategyArtifactStore,
    deadlines: PhaseDeadlines,
    tokens: Arc<RwLock<HashMap<Uuid, CancellationToken>>>,
}

enum RunOutcome {
    Succeeded(Vec<Block>),
    Failed(TriadError),
    Cancelled,
}

impl Orchestrator {
    pub fn new(
        pool: PgPool,
        registry: JobRegistry,
        events: EventBus,
        models: RoleHandles,
        enrichers: Enrichers,
        catalog: VenueCatalog,
        deadlines: PhaseDeadlines,
    ) -> Self {
        Self {
            registry,
            events,
            models,
            enrichers,
            catalog,
            artifacts: ArtifactStore::new(pool.clone()),
            strategy_artifacts: StrategyArtifactStore::new(pool),
            deadlines,
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn strategy_artifacts(&self) -> &StrategyArtifactStore {
        &self.strategy_artifacts
    }

    /// Cooperatively cancel an in-flight job. A no-op, not an error, if
    /// the job already finished or was never tracked here.
    pub async fn cancel(&self, job_id: Uuid) -> TriadResult<()> {
        let tokens = self.tokens.read().await;
        match tokens.get(&job_id) {
            Some(token) => {
                token.cancel();
                Ok(())
            }
            None => Err(TriadError::NotFound(format!("no in-flight job {job_id}"))),
        }
    }

    /// Drives `job_id` through all three phases, persists the artifact on
    /// success, and marks the job terminal exactly once.
    pub async fn run(&self, job_id: Uuid, snapshot: Snapshot) {
        let token = CancellationToken::new();
        self.tokens.write().await.insert(job_id, token.clone());

        let outcome = tokio::select! {
            _ = token.cancelled() => RunOutcome::Cancelled,
            result = tokio::time::timeout(
                self.deadlines.total_budget,
                self.execute(job_id, &snapshot, &token),
            ) => match result {
                Ok(Ok(blocks)) => RunOutcome::Succeeded(blocks),
                Ok(Err(e)) => RunOutcome::Failed(e),
                Err(_) => RunOutcome::Failed(TriadError::BudgetExhausted),
            },
        };

        self.tokens.write().await.remove(&job_id);
        self.finish(job_id, outcome).await;
    }

    async fn finish(&self, job_id: Uuid, outcome: RunOutcome) {
        match outcome {
            RunOutcome::Succeeded(blocks) => {
                if let Err(e) = self.artifacts.put(job_id, &blocks).await {
                    tracing::error!(%job_id, error = %e, "artifact persistence failed after success");
                    self.fail(job_id, e).await;
                    return;
                }
                let _ = self.registry.complete(job_id, JobOutcome::Succeeded).await;
                self.events
                    .publish(job_id, EventKind::PhaseChange { phase: Phase::Done })
                    .await;
                self.events.publish(job_id, EventKind::JobSucceeded).await;
            }
            RunOutcome::Failed(e) => self.fail(job_id, e).await,
            RunOutcome::Cancelled => {
                let _ = self.registry.complete(job_id, JobOutcome::Cancelled).await;
                self.events.publish(job_id, EventKind::JobCancelled).await;
            }
        }
    }

    async fn fail(&self, job_id: Uuid, error: TriadError) {
        let code = error.code().to_string();
        let message = error.to_string();
        let _ = self
            .registry
            .complete(job_id, JobOutcome::Failed { code: code.clone(), message: message.clone() })
            .await;
        self.events
            .publish(job_id, EventKind::JobFailed { code, message })
            .await;
    }

    async fn execute(
        &self,
        job_id: Uuid,
        snapshot: &Snapshot,
        token: &CancellationToken,
    ) -> TriadResult<Vec<Block>> {
        let tz: Tz = snapshot.resolved.timezone.parse().unwrap_or(chrono_tz::UTC);
        let correlation_id = self.registry.read(job_id).await?.correlation_id;

        self.advance(job_id, Phase::P1).await?;
        let phase1 = with_cancellation(
            token,
            phase1::execute(&self.models, snapshot, correlation_id, self.deadlines.phase1),
        )
        .await?;

        self.advance(job_id, Phase::P2).await?;
        let phase2 = with_cancellation(
            token,
            phase2::execute(
                &self.models,
                &phase1,
                snapshot.snapshot_id,
                correlation_id,
                self.deadlines.phase2,
            ),
        )
        .await?;
        self.strategy_artifacts
            .put(job_id, &StrategyArtifact::from_phase2(&phase2))
            .await?;

        self.advance(job_id, Phase::P3).await?;
        let phase3 = with_cancellation(
            token,
            phase3::execute(
                &self.models,
                &self.enrichers,
                &self.catalog,
                &phase2,
                snapshot,
                tz,
                correlation_id,
                self.deadlines.phase3,
            ),
        )
        .await?;

        let title = format!(
            "Strategy for {}",
            snapshot
                .resolved
                .city
                .clone()
                .unwrap_or_else(|| snapshot.resolved.formatted_address.clone())
        );
        let blocks = assemble(&title, &phase1.narrative, &phase3.venues);
        validate_artifact(&blocks)?;
        Ok(blocks)
    }

    async fn advance(&self, job_id: Uuid, phase: Phase) -> TriadResult<()> {
        self.registry.advance(job_id, phase).await?;
        self.events.publish(job_id, EventKind::PhaseChange { phase }).await;
        Ok(())
    }
}

async fn with_cancellation<T>(
    token: &CancellationToken,
    fut: impl Future<Output = TriadResult<T>>,
) -> TriadResult<T> {
    tokio::select! {
        _ = token.cancelled() => Err(TriadError::Cancelled),
        result = fut => result,
    }
}
