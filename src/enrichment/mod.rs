//! Enrichment Services (C4): reverse-geocode, places metadata, route
//! matrix. See §4.4.

pub mod cache;
pub mod geocode;
pub mod places;
pub mod routes;
pub mod types;

use std::sync::Arc;

pub use geocode::GeocodeClient;
pub use places::PlacesClient;
pub use routes::RoutesClient;

/// Bundle of the three enrichment clients, handed to the Orchestrator and
/// to the Snapshot Store at startup wire-up (Design Note: explicit
/// context object instead of process-wide singletons).
#[derive(Clone)]
pub struct Enrichers {
    pub geocode: Arc<GeocodeClient>,
    pub places: Arc<PlacesClient>,
    pub routes: Arc<RoutesClient>,
}

impl Enrichers {
    pub fn new(geocoder_key: String, places_key: String, routes_key: String) -> Self {
        Self {
            geocode: Arc::new(GeocodeClient::new(geocoder_key)),
            places: Arc::new(PlacesClient::new(places_key)),
            routes: Arc::new(RoutesClient::new(routes_key)),
        }
    }
}
