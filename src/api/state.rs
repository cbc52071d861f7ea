//! Shared application state (§6).
//!
//! Same shape as the teacher's `StewardshipState`/`OrchestratorContext`:
//! one `Clone`-able struct bundling the pool and every long-lived service,
//! threaded through the router with `axum::extract::State`.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::events::EventBus;
use crate::job::JobRegistry;
use crate::orchestrator::Orchestrator;
use crate::snapshot::SnapshotStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub snapshots: Arc<SnapshotStore>,
    pub jobs: Arc<JobRegistry>,
    pub events: EventBus,
    pub orchestrator: Arc<Orchestrator>,
    pub config: Arc<Config>,
}
