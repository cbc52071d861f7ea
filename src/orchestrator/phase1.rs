//! Phase 1 — context assembly (§4.6, fan-out = 3).
//!
//! Strategist narrative, Briefer context (same adapter, a different
//! prompt), and a deterministic holiday lookup run concurrently. Only
//! the Strategist result is fatal to the job; the other two degrade the
//! downstream prompt quality when missing.

use std::time::Duration;

use uuid::Uuid;

use crate::error::{TriadError, TriadResult};
use crate::job::Phase;
use crate::models::{ModelConstraints, ModelRequest, ReasoningEffort, Role, RoleHandles};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone)]
pub struct HolidayInfo {
    pub is_holiday: bool,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Phase1Output {
    pub narrative: String,
    pub briefing: Option<String>,
    pub holiday: Option<HolidayInfo>,
}

fn strategist_request(snapshot: &Snapshot, correlation_id: Uuid) -> ModelRequest {
    ModelRequest {
        system: "You advise a rideshare driver where to go in the next 30-90 minutes.".to_string(),
        user: format!(
            "Driver is at {} ({}), timezone {}. Give a short strategy narrative.",
            snapshot.resolved.formatted_address, snapshot.resolved.country, snapshot.resolved.timezone
        ),
        constraints: ModelConstraints {
            reasoning_effort: ReasoningEffort::Medium,
            json_mode: false,
            timeout: Role::Strategist.timeout_budget(),
        },
        phase: Phase::P1,
        snapshot_id: snapshot.snapshot_id,
        correlation_id,
    }
}

fn briefing_request(snapshot: &Snapshot, correlation_id: Uuid) -> ModelRequest {
    ModelRequest {
        system: "You summarize weather, traffic, and local news relevant to a driver's next hour."
            .to_string(),
        user: format!(
            "Location: {} ({}).",
            snapshot.resolved.formatted_address, snapshot.resolved.country
        ),
        constraints: ModelConstraints {
            reasoning_effort: ReasoningEffort::Low,
            json_mode: false,
            timeout: Role::Strategist.timeout_budget(),
        },
        phase: Phase::P1,
        snapshot_id: snapshot.snapshot_id,
        correlation_id,
    }
}

/// A fixed US federal holiday table. No network calendar lookup here —
/// a deterministic source is enough for the narrative-quality hint this
/// feeds; it never blocks or fails the phase.
fn lookup_holiday(snapshot: &Snapshot) -> HolidayInfo {
    let local = snapshot.captured_at.with_timezone(&chrono::Utc);
    use chrono::Datelike;
    let (month, day) = (local.month(), local.day());
    let name = match (month, day) {
        (1, 1) => Some("New Year's Day"),
        (7, 4) => Some("Independence Day"),
        (12, 25) => Some("Christmas Day"),
        (11, 11) => Some("Veterans Day"),
        _ => None,
    };
    HolidayInfo {
        is_holiday: name.is_some(),
        name: name.map(str::to_string),
    }
}

pub async fn execute(
    models: &RoleHandles,
    snapshot: &Snapshot,
    correlation_id: Uuid,
    deadline: Duration,
) -> TriadResult<Phase1Output> {
    let strategist_fut = models
        .strategist
        .call(Role::Strategist, strategist_request(snapshot, correlation_id));
    let briefer_fut = models
        .strategist
        .call(Role::Strategist, briefing_request(snapshot, correlation_id));
    let holiday = lookup_holiday(snapshot);

    let (strategist_res, briefer_res) = tokio::time::timeout(deadline, async {
        tokio::join!(strategist_fut, briefer_fut)
    })
    .await
    .map_err(|_| TriadError::StrategistFailed("phase 1 deadline exceeded".to_string()))?;

    // Missing Strategist narrative is fatal (§4.6).
    let narrative = strategist_res?.text;

    let briefing = match briefer_res {
        Ok(r) => Some(r.text),
        Err(e) => {
            tracing::warn!(error = %e, "briefer call failed, degrading prompt quality");
            None
        }
    };

    Ok(Phase1Output {
        narrative,
        briefing,
        holiday: Some(holiday),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn snapshot_at(month: u32, day: u32) -> Snapshot {
        use crate::snapshot::{Coordinates, ResolvedLocation};
        Snapshot {
            snapshot_id: uuid::Uuid::new_v4(),
            coordinates: Coordinates::new(32.9, -97.0).unwrap(),
            captured_at: Utc.with_ymd_and_hms(2026, month, day, 12, 0, 0).unwrap(),
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

    #[test]
    fn recognizes_fixed_holiday() {
        let info = lookup_holiday(&snapshot_at(7, 4));
        assert!(info.is_holiday);
        assert_eq!(info.name.as_deref(), Some("Independence Day"));
    }

    #[test]
    fn ordinary_day_is_not_a_holiday() {
        let info = lookup_holiday(&snapshot_at(3, 15));
        assert!(!info.is_holiday);
    }
}
