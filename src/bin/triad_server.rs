//! TRIAD Orchestrator REST + SSE server.
//!
//! Wiring mirrors the teacher's `bin/agentic_server.rs`: init tracing,
//! connect the pool, assemble the router, layer CORS/tracing, bind and
//! serve.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use triad_core::api::{create_triad_router, AppState};
use triad_core::catalog::VenueCatalog;
use triad_core::config::Config;
use triad_core::enrichment::Enrichers;
use triad_core::events::EventBus;
use triad_core::job::JobRegistry;
use triad_core::models::{HttpModelProvider, RoleHandles};
use triad_core::orchestrator::{Orchestrator, PhaseDeadlines};
use triad_core::snapshot::SnapshotStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    tracing::info!(bind_addr = %config.bind_addr, bind_port = config.bind_port, "starting triad-server");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    let enrichers = Enrichers::new(
        config.geocoder_api_key.clone(),
        config.places_api_key.clone(),
        config.routes_api_key.clone(),
    );

    let models = RoleHandles {
        strategist: Arc::new(HttpModelProvider::new(
            "strategist-provider".to_string(),
            config.strategist_model_id.clone(),
            config.strategist_api_key.clone(),
            "https://models.example.com/v1/complete".to_string(),
        )),
        planner: Arc::new(HttpModelProvider::new(
            "planner-provider".to_string(),
            config.planner_model_id.clone(),
            config.planner_api_key.clone(),
            "https://models.example.com/v1/complete".to_string(),
        )),
        validator: Arc::new(HttpModelProvider::new(
            "validator-provider".to_string(),
            config.validator_model_id.clone(),
            config.validator_api_key.clone(),
            "https://models.example.com/v1/complete".to_string(),
        )),
    };

    let catalog = match &config.venue_catalog_seed_path {
        Some(path) => VenueCatalog::load_from_path(path)?,
        None => VenueCatalog::empty(),
    };

    let registry = JobRegistry::new(pool.clone(), config.retry_cooldown);
    let events = EventBus::new();

    let orchestrator = Orchestrator::new(
        pool.clone(),
        registry.clone(),
        events.clone(),
        models,
        enrichers.clone(),
        catalog,
        PhaseDeadlines {
            phase1: config.phase1_deadline,
            phase2: config.phase2_deadline,
            phase3: config.phase3_deadline,
            total_budget: config.total_budget,
        },
    );

    let state = AppState {
        pool: pool.clone(),
        snapshots: Arc::new(SnapshotStore::new(pool.clone(), enrichers.geocode.clone())),
        jobs: Arc::new(registry),
        events,
        orchestrator: Arc::new(orchestrator),
        config: Arc::new(config.clone()),
    };

    let app = create_triad_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.bind_addr, config.bind_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "triad-server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
