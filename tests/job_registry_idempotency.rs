//! Job Registry idempotency (§8 scenario 5): ten concurrent `enqueue`
//! calls for the same snapshot converge on one job row, and only one of
//! them reports `started = true`.
//!
//! Grounded in the teacher's integration-test convention
//! (`tests/phase3_database_orchestration.rs`): read `TEST_DATABASE_URL`,
//! skip with a warning instead of failing the suite when no test
//! database is reachable, so this test runs only where the harness
//! actually provisions Postgres.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use triad_core::job::JobRegistry;

async fn setup_test_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(12)
        .connect(&url)
        .await
        .ok()?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            job_id UUID PRIMARY KEY,
            snapshot_id UUID NOT NULL UNIQUE,
            status VARCHAR NOT NULL,
            attempt INTEGER NOT NULL,
            correlation_id UUID NOT NULL,
            phase VARCHAR NOT NULL,
            error_code VARCHAR,
            error_message VARCHAR,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .ok()?;

    Some(pool)
}

#[tokio::test]
async fn ten_concurrent_enqueues_produce_exactly_one_job() {
    let Some(pool) = setup_test_pool().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set or unreachable");
        return;
    };

    let snapshot_id = Uuid::new_v4();
    let registry = JobRegistry::new(pool.clone(), Duration::from_secs(30));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move { registry.enqueue(snapshot_id).await.unwrap() }));
    }

    let mut job_ids = std::collections::HashSet::new();
    let mut started_count = 0;
    for handle in handles {
        let (job_handle, started) = handle.await.unwrap();
        job_ids.insert(job_handle.job_id);
        if started {
            started_count += 1;
        }
    }

    assert_eq!(job_ids.len(), 1, "all ten calls must resolve to the same job_id");
    assert_eq!(started_count, 1, "exactly one caller should have started the attempt");

    let row_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE snapshot_id = $1")
        .bind(snapshot_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row_count, 1);

    sqlx::query("DELETE FROM jobs WHERE snapshot_id = $1")
        .bind(snapshot_id)
        .execute(&pool)
        .await
        .unwrap();
}
