//! Venue Candidate (§3): intermediate, not user-visible. Produced by the
//! Planner (Phase 3), filled in by the Enrichers (C4), consumed by the
//! Block Assembler (C8) and Validation Gate (C9).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enrichment::types::BusinessHours;
use crate::snapshot::Coordinates;

/// A time-bound happening at a venue (e.g. "happy hour until 9pm"),
/// surfaced by the Planner as a list item candidate. Subject to the
/// freshness rule in C9 — an item whose `end_time` is not in the future
/// is dropped before the block is assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueEvent {
    pub description: String,
    pub end_time: Option<DateTime<Utc>>,
}

/// A venue as generated by the Planner, before enrichment.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerVenue {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub staging_lat: f64,
    pub staging_lng: f64,
    pub category: String,
    pub estimated_earnings: String,
    pub rationale: String,
    pub events: Vec<VenueEvent>,
}

/// A venue after C4 enrichment: hours, drive time, place identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueCandidate {
    pub name: String,
    pub coordinates: Coordinates,
    pub staging_coordinates: Coordinates,
    pub category: String,
    pub estimated_earnings: String,
    pub rationale: String,
    pub events: Vec<VenueEvent>,
    pub drive_time_s: Option<f64>,
    pub hours: BusinessHours,
    /// Reliability score carried through from the catalog match, if any.
    pub reliability_score: Option<f64>,
}

impl VenueCandidate {
    pub fn from_planner(venue: PlannerVenue) -> crate::error::TriadResult<Self> {
        Ok(Self {
            name: venue.name,
            coordinates: Coordinates::new(venue.lat, venue.lng)?,
            staging_coordinates: Coordinates::new(venue.staging_lat, venue.staging_lng)?,
            category: venue.category,
            estimated_earnings: venue.estimated_earnings,
            rationale: venue.rationale,
            events: venue.events,
            drive_time_s: None,
            hours: BusinessHours::Unknown,
            reliability_score: None,
        })
    }
}
