//! Shapes shared by the three enrichment primitives (§4.4).

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub place_id: String,
    pub formatted_address: String,
    pub timezone: String,
    pub city: Option<String>,
    pub region: Option<String>,
    /// ISO 3166-1 alpha-2.
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessHoursDay {
    pub weekday: Weekday,
    pub open: Option<String>,
    pub close: Option<String>,
}

/// Business hours, or explicitly unknown. Never fabricated — see §4.4
/// and Design Note "Hours invention": hours come only from the places
/// provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BusinessHours {
    Known(Vec<BusinessHoursDay>),
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceMetadata {
    pub place_id: String,
    pub display_name: String,
    pub formatted_address: String,
    pub hours: BusinessHours,
    pub business_status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_m: f64,
    pub duration_s: f64,
    pub traffic_aware_duration_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteMatrixRequest {
    pub origin: (f64, f64),
    pub destinations: Vec<(f64, f64)>,
    pub departure_time: DateTime<Utc>,
}
