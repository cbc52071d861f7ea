//! Snapshot Store (C1). See §4.1.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use uuid::Uuid;

use crate::enrichment::GeocodeClient;
use crate::error::{TriadError, TriadResult};
use crate::snapshot::types::{Coordinates, ResolvedLocation, Snapshot, SnapshotRequest};

const GEOCODE_BOUND: Duration = Duration::from_secs(2);

pub struct SnapshotStore {
    pool: PgPool,
    geocoder: Arc<GeocodeClient>,
}

impl SnapshotStore {
    pub fn new(pool: PgPool, geocoder: Arc<GeocodeClient>) -> Self {
        Self { pool, geocoder }
    }

    /// Validate, resolve, and persist a snapshot. Geocode/timezone
    /// resolution happens synchronously with a 2s bound; on failure the
    /// snapshot is never written (§4.1).
    pub async fn put(&self, request: SnapshotRequest) -> TriadResult<Uuid> {
        let coordinates = Coordinates::new(request.lat, request.lng)?;

        let geocoded = self
            .geocoder
            .reverse_geocode(coordinates.lat, coordinates.lng, GEOCODE_BOUND)
            .await?;

        let snapshot = Snapshot {
            snapshot_id: Uuid::new_v4(),
            coordinates,
            captured_at: request.captured_at,
            resolved: ResolvedLocation {
                timezone: geocoded.timezone,
                city: geocoded.city,
                region: geocoded.region,
                country: geocoded.country,
                formatted_address: geocoded.formatted_address,
            },
            // Weather is optional and resolved out-of-band; this request
            // path never blocks on it (§4.1).
            weather: None,
            device_id: request.device,
        };

        sqlx::query(
            r#"
            INSERT INTO snapshots
                (snapshot_id, lat, lng, captured_at, timezone, city, region, country,
                 formatted_address, weather, device_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(snapshot.snapshot_id)
        .bind(snapshot.coordinates.lat)
        .bind(snapshot.coordinates.lng)
        .bind(snapshot.captured_at)
        .bind(&snapshot.resolved.timezone)
        .bind(&snapshot.resolved.city)
        .bind(&snapshot.resolved.region)
        .bind(&snapshot.resolved.country)
        .bind(&snapshot.resolved.formatted_address)
        .bind(snapshot.weather.as_ref().map(|w| serde_json::to_value(w).unwrap_or_default()))
        .bind(&snapshot.device_id)
        .execute(&self.pool)
        .await
        .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?;

        Ok(snapshot.snapshot_id)
    }

    pub async fn get(&self, snapshot_id: Uuid) -> TriadResult<Snapshot> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT snapshot_id, lat, lng, captured_at, timezone, city, region, country,
                   formatted_address, weather, device_id
            FROM snapshots WHERE snapshot_id = $1
            "#,
        )
        .bind(snapshot_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TriadError::StorageUnavailable(e.to_string()))?
        .ok_or_else(|| TriadError::NotFound(format!("snapshot {snapshot_id}")))?;

        row.try_into()
    }
}

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    snapshot_id: Uuid,
    lat: f64,
    lng: f64,
    captured_at: chrono::DateTime<chrono::Utc>,
    timezone: String,
    city: Option<String>,
    region: Option<String>,
    country: String,
    formatted_address: String,
    weather: Option<serde_json::Value>,
    device_id: Option<String>,
}

impl TryFrom<SnapshotRow> for Snapshot {
    type Error = TriadError;

    fn try_from(row: SnapshotRow) -> Result<Self, Self::Error> {
        let weather = row
            .weather
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e: serde_json::Error| TriadError::StorageUnavailable(e.to_string()))?;

        Ok(Snapshot {
            snapshot_id: row.snapshot_id,
            coordinates: Coordinates::new(row.lat, row.lng)?,
            captured_at: row.captured_at,
            resolved: ResolvedLocation {
                timezone: row.timezone,
                city: row.city,
                region: row.region,
                country: row.country,
                formatted_address: row.formatted_address,
            },
            weather,
            device_id: row.device_id,
        })
    }
}
