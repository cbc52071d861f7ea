//! Phase 3 — tactical planning and enrichment (§4.6).
//!
//! One Planner call produces 3-7 candidate venues. Each candidate is
//! enriched concurrently through C4 (geocode → places → routes) with a
//! bounded worker pool (width 4, §5's per-provider concurrency caps), then
//! the Validator (C3) issues a single structural verdict over the
//! enriched set.

use std::time::Duration;

use chrono_tz::Tz;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::catalog::VenueCatalog;
use crate::enrichment::Enrichers;
use crate::error::{TriadError, TriadResult};
use crate::job::Phase;
use crate::models::{ModelConstraints, ModelRequest, ReasoningEffort, Role, RoleHandles};
use crate::orchestrator::phase2::Phase2Output;
use crate::snapshot::{Coordinates, Snapshot};
use crate::validation::drop_stale_events;
use crate::venue::{PlannerVenue, VenueCandidate};

const ENRICHMENT_CONCURRENCY: usize = 4;
const ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(5);
const CATALOG_SHORTLIST_SIZE: usize = 10;

pub struct Phase3Output {
    pub venues: Vec<VenueCandidate>,
}

fn planner_request(
    phase2: &Phase2Output,
    snapshot: &Snapshot,
    catalog: &VenueCatalog,
    correlation_id: Uuid,
) -> ModelRequest {
    let shortlist = catalog.nearby(snapshot.coordinates, CATALOG_SHORTLIST_SIZE);
    let catalog_hint = if shortlist.is_empty() {
        "No curated venues nearby; generate venues from scratch.".to_string()
    } else {
        let names: Vec<String> = shortlist
            .iter()
            .map(|v| format!("{} ({}, reliability {:.2})", v.name, v.category, v.reliability_score))
            .collect();
        format!("Curated venues to consider: {}", names.join("; "))
    };

    ModelRequest {
        system: "Return a JSON array of 3 to 7 staging venues for a rideshare driver. Each item \
                 has name, lat, lng, staging_lat, staging_lng, category, estimated_earnings, \
                 rationale, events (array of {description, end_time})."
            .to_string(),
        user: format!(
            "Daily plan: {}\nImmediate plan: {}\nDriver location: {}\n{}",
            phase2.daily, phase2.immediate, snapshot.resolved.formatted_address, catalog_hint
        ),
        constraints: ModelConstraints {
            reasoning_effort: ReasoningEffort::Max,
            json_mode: true,
            timeout: Role::Planner.timeout_budget(),
        },
        phase: Phase::P3,
        snapshot_id: snapshot.snapshot_id,
        correlation_id,
    }
}

#[derive(Debug, Deserialize)]
struct ValidatorVerdict {
    valid: bool,
    #[serde(default)]
    reasons: Vec<String>,
}

fn validator_request(
    venues: &[VenueCandidate],
    snapshot_id: Uuid,
    correlation_id: Uuid,
) -> TriadResult<ModelRequest> {
    let payload = serde_json::to_string(venues)
        .map_err(|e| TriadError::ValidatorFailed(format!("failed to serialize venues: {e}")))?;
    Ok(ModelRequest {
        system: "Return {\"valid\": bool, \"reasons\": [string]} judging whether the venue set \
                 below is structurally sound."
            .to_string(),
        user: payload,
        constraints: ModelConstraints {
            reasoning_effort: ReasoningEffort::Medium,
            json_mode: true,
            timeout: Role::Validator.timeout_budget(),
        },
        phase: Phase::P3,
        snapshot_id,
        correlation_id,
    })
}

async fn enrich_one(
    enrichers: &Enrichers,
    origin: Coordinates,
    mut venue: VenueCandidate,
) -> TriadResult<VenueCandidate> {
    let geocoded = enrichers
        .geocode
        .reverse_geocode(venue.coordinates.lat, venue.coordinates.lng, ENRICHMENT_TIMEOUT)
        .await
        .map_err(|e| TriadError::EnrichmentFailed(format!("{}: {e}", venue.name)))?;

    let metadata = enrichers
        .places
        .metadata(&geocoded.place_id)
        .await
        .map_err(|e| TriadError::EnrichmentFailed(format!("{}: {e}", venue.name)))?;

    let request = crate::enrichment::routes::RoutesClient::build_request(
        (origin.lat, origin.lng),
        vec![(venue.coordinates.lat, venue.coordinates.lng)],
    );
    let legs = enrichers
        .routes
        .matrix(&request)
        .await
        .map_err(|e| TriadError::EnrichmentFailed(format!("{}: {e}", venue.name)))?;

    venue.hours = metadata.hours;
    venue.drive_time_s = legs.first().map(|l| l.traffic_aware_duration_s);
    Ok(venue)
}

pub async fn execute(
    models: &RoleHandles,
    enrichers: &Enrichers,
    catalog: &VenueCatalog,
    phase2: &Phase2Output,
    snapshot: &Snapshot,
    tz: Tz,
    correlation_id: Uuid,
    deadline: Duration,
) -> TriadResult<Phase3Output> {
    tokio::time::timeout(deadline, async {
        let planner_response = models
            .planner
            .call(Role::Planner, planner_request(phase2, snapshot, catalog, correlation_id))
            .await?;

        let planner_venues: Vec<PlannerVenue> = serde_json::from_str(&planner_response.text)
            .map_err(|e| TriadError::PlannerFailed(format!("malformed venue JSON: {e}")))?;
        if planner_venues.is_empty() {
            return Err(TriadError::PlannerFailed("planner returned no venues".to_string()));
        }

        let mut candidates = Vec::with_capacity(planner_venues.len());
        for pv in planner_venues {
            let mut candidate = VenueCandidate::from_planner(pv)?;
            drop_stale_events(&mut candidate, snapshot.captured_at, tz);
            candidates.push(candidate);
        }

        let semaphore = Semaphore::new(ENRICHMENT_CONCURRENCY);
        let origin = snapshot.coordinates;
        let total_candidates = candidates.len();
        let enriched: Vec<VenueCandidate> = stream::iter(candidates)
            .map(|candidate| {
                let semaphore = &semaphore;
                let enrichers = enrichers;
                async move {
                    let _permit = semaphore.acquire().await.expect("semaphore not closed");
                    enrich_one(enrichers, origin, candidate).await
                }
            })
            .buffer_unordered(ENRICHMENT_CONCURRENCY)
            .filter_map(|result| async move {
                match result {
                    Ok(v) => Some(v),
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping venue that failed enrichment");
                        None
                    }
                }
            })
            .collect()
            .await;

        if enriched.len() * 2 <= total_candidates {
            return Err(TriadError::EnrichmentFailed(format!(
                "{} of {} venues failed enrichment",
                total_candidates - enriched.len(),
                total_candidates
            )));
        }

        let verdict_response = models
            .validator
            .call(Role::Validator, validator_request(&enriched, snapshot.snapshot_id, correlation_id)?)
            .await?;
        let verdict: ValidatorVerdict = serde_json::from_str(&verdict_response.text)
            .map_err(|e| TriadError::ValidatorFailed(format!("malformed verdict JSON: {e}")))?;
        if !verdict.valid {
            return Err(TriadError::ValidationFailed(verdict.reasons.join("; ")));
        }

        Ok(Phase3Output { venues: enriched })
    })
    .await
    .map_err(|_| TriadError::PlannerFailed("phase 3 deadline exceeded".to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogVenue;
    use crate::snapshot::{Coordinates, ResolvedLocation};
    use uuid::Uuid;

    fn snapshot_near_dallas() -> Snapshot {
        Snapshot {
            snapshot_id: Uuid::new_v4(),
            coordinates: Coordinates::new(32.8968, -97.038).unwrap(),
            captured_at: chrono::Utc::now(),
            resolved: ResolvedLocation {
                timezone: "America/Chicago".to_string(),
                city: Some("Fort Worth".to_string()),
                region: Some("TX".to_string()),
                country: "US".to_string(),
                formatted_address: "Fort Worth, TX".to_string(),
            },
            weather: None,
            device_id: None,
        }
    }

    fn phase2_output() -> Phase2Output {
        Phase2Output {
            daily: "stay downtown".to_string(),
            immediate: "head to the stadium".to_string(),
            narrative_model_id: "planner-v1".to_string(),
            narrative_params_fingerprint: "effort=High,json_mode=false".to_string(),
            narrative_prompt_version: "consolidator-v1".to_string(),
            narrative_latency_ms: 120,
        }
    }

    #[test]
    fn empty_catalog_tells_planner_to_generate_from_scratch() {
        let catalog = VenueCatalog::empty();
        let request =
            planner_request(&phase2_output(), &snapshot_near_dallas(), &catalog, Uuid::new_v4());
        assert!(request.user.contains("generate venues from scratch"));
    }

    #[test]
    fn populated_catalog_surfaces_shortlist_in_prompt() {
        let venue = CatalogVenue {
            venue_id: Uuid::new_v4(),
            name: "Union Station".to_string(),
            coordinates: Coordinates::new(32.9, -97.0).unwrap(),
            staging_coordinates: Coordinates::new(32.9, -97.0).unwrap(),
            category: "transit".to_string(),
            reliability_score: 0.92,
            district: "downtown".to_string(),
        };
        let catalog = VenueCatalog::from_seed(vec![venue]);
        let request =
            planner_request(&phase2_output(), &snapshot_near_dallas(), &catalog, Uuid::new_v4());
        assert!(request.user.contains("Union Station"));
        assert!(request.user.contains("0.92"));
    }
}
