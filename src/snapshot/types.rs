//! Snapshot data model (§3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TriadError, TriadResult};

/// A GPS coordinate pair at six-decimal precision (~11 cm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> TriadResult<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(TriadError::InvalidInput(format!(
                "latitude {lat} out of range [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(TriadError::InvalidInput(format!(
                "longitude {lng} out of range [-180, 180]"
            )));
        }
        // Preserve six-decimal precision; anything finer is noise for this domain.
        let round6 = |v: f64| (v * 1_000_000.0).round() / 1_000_000.0;
        Ok(Self {
            lat: round6(lat),
            lng: round6(lng),
        })
    }

    pub fn cache_key(&self) -> String {
        crate::util::coords_key(self.lat, self.lng)
    }
}

/// Optional weather context captured alongside a snapshot. Never blocks
/// the snapshot write if unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub condition: String,
    pub temperature_c: f64,
    pub precipitation_probability: Option<f64>,
}

/// Resolved location context attached to a Snapshot at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub timezone: String,
    pub city: Option<String>,
    pub region: Option<String>,
    /// ISO 3166-1 alpha-2 at rest. Display names are derived at read time.
    pub country: String,
    pub formatted_address: String,
}

/// Immutable record of a driver's GPS fix and resolved context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_id: Uuid,
    pub coordinates: Coordinates,
    pub captured_at: DateTime<Utc>,
    pub resolved: ResolvedLocation,
    pub weather: Option<WeatherSnapshot>,
    pub device_id: Option<String>,
}

/// Inbound request shape for `POST /snapshot`, before resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotRequest {
    pub lat: f64,
    pub lng: f64,
    pub captured_at: DateTime<Utc>,
    pub device: Option<String>,
    pub context: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_latitude() {
        assert!(Coordinates::new(91.0, 0.0).is_err());
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        assert!(Coordinates::new(0.0, 181.0).is_err());
    }

    #[test]
    fn zero_zero_is_valid() {
        assert!(Coordinates::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn preserves_six_decimal_precision() {
        let c = Coordinates::new(32.8968001, -97.0380009).unwrap();
        assert_eq!(c.lat, 32.8968);
        assert_eq!((c.lng * 1_000_000.0).round(), -97_038_001.0);
    }
}
