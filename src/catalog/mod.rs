//! Venue Catalog / Proximity Filter (C5). See §4.5.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::snapshot::Coordinates;
use crate::util::haversine_meters;

const MAX_DISTANCE_M: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogVenue {
    pub venue_id: Uuid,
    pub name: String,
    pub coordinates: Coordinates,
    pub staging_coordinates: Coordinates,
    pub category: String,
    /// 0..1
    pub reliability_score: f64,
    pub district: String,
}

#[derive(Clone)]
pub struct VenueCatalog {
    venues: Vec<CatalogVenue>,
}

impl VenueCatalog {
    pub fn empty() -> Self {
        Self { venues: Vec::new() }
    }

    pub fn from_seed(venues: Vec<CatalogVenue>) -> Self {
        Self { venues }
    }

    pub fn load_from_path(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let venues: Vec<CatalogVenue> = serde_json::from_str(&contents)?;
        Ok(Self::from_seed(venues))
    }

    /// Great-circle prefilter within the 100km cap, applied before any
    /// scoring step (§4.5). An empty result (empty catalog, or no venue
    /// within range) signals "let the Planner generate from scratch" —
    /// never an error, even for cross-continental coordinates (§8).
    pub fn nearby(&self, origin: Coordinates, limit: usize) -> Vec<CatalogVenue> {
        let mut scored: Vec<(f64, &CatalogVenue)> = self
            .venues
            .iter()
            .map(|v| {
                (
                    haversine_meters(origin.lat, origin.lng, v.coordinates.lat, v.coordinates.lng),
                    v,
                )
            })
            .filter(|(distance, _)| *distance <= MAX_DISTANCE_M)
            .collect();

        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(limit).map(|(_, v)| v.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(lat: f64, lng: f64) -> CatalogVenue {
        CatalogVenue {
            venue_id: Uuid::new_v4(),
            name: "Test Venue".to_string(),
            coordinates: Coordinates::new(lat, lng).unwrap(),
            staging_coordinates: Coordinates::new(lat, lng).unwrap(),
            category: "airport".to_string(),
            reliability_score: 0.8,
            district: "downtown".to_string(),
        }
    }

    #[test]
    fn empty_catalog_returns_empty_shortlist() {
        let catalog = VenueCatalog::empty();
        let origin = Coordinates::new(32.8968, -97.038).unwrap();
        assert!(catalog.nearby(origin, 10).is_empty());
    }

    #[test]
    fn filters_out_venues_beyond_cap() {
        let near = venue(32.9, -97.0);
        let far = venue(49.0097, 2.5479); // Paris, > 1000km from Dallas
        let catalog = VenueCatalog::from_seed(vec![near.clone(), far]);
        let origin = Coordinates::new(32.8968, -97.038).unwrap();
        let result = catalog.nearby(origin, 10);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].venue_id, near.venue_id);
    }

    #[test]
    fn cross_continental_never_errors() {
        let catalog = VenueCatalog::from_seed(vec![venue(32.9, -97.0)]);
        let origin = Coordinates::new(-33.8688, 151.2093).unwrap(); // Sydney
        assert!(catalog.nearby(origin, 10).is_empty());
    }
}
