//! Traffic-aware route matrix primitive (§4.4.3).
//!
//! Departure time is always "now + 30s" to satisfy the provider's
//! future-departure requirement — the 30s offset is applied here, once,
//! so no call site has to remember it.

use chrono::{Duration as ChronoDuration, Utc};
use serde::Deserialize;

use crate::enrichment::types::{RouteLeg, RouteMatrixRequest};
use crate::error::{TriadError, TriadResult};

pub struct RoutesClient {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl RoutesClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://maps.example.com/routes/v1/matrix".to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn build_request(origin: (f64, f64), destinations: Vec<(f64, f64)>) -> RouteMatrixRequest {
        RouteMatrixRequest {
            origin,
            destinations,
            departure_time: Utc::now() + ChronoDuration::seconds(30),
        }
    }

    pub async fn matrix(&self, request: &RouteMatrixRequest) -> TriadResult<Vec<RouteLeg>> {
        let response = self
            .client
            .post(&self.base_url)
            .query(&[("key", self.api_key.clone())])
            .json(&serde_json::json!({
                "origin": {"lat": request.origin.0, "lng": request.origin.1},
                "destinations": request.destinations.iter().map(|(lat, lng)| {
                    serde_json::json!({"lat": lat, "lng": lng})
                }).collect::<Vec<_>>(),
                "departure_time": request.departure_time,
            }))
            .send()
            .await
            .map_err(|e| TriadError::EnrichmentFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(TriadError::EnrichmentFailed(format!(
                "routes provider returned {status}"
            )));
        }

        #[derive(Deserialize)]
        struct ApiLeg {
            distance_m: f64,
            duration_s: f64,
            traffic_aware_duration_s: f64,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            legs: Vec<ApiLeg>,
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| TriadError::EnrichmentFailed(e.to_string()))?;

        Ok(body
            .legs
            .into_iter()
            .map(|l| RouteLeg {
                distance_m: l.distance_m,
                duration_s: l.duration_s,
                traffic_aware_duration_s: l.traffic_aware_duration_s,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_request_departs_thirty_seconds_out() {
        let req = RoutesClient::build_request((0.0, 0.0), vec![(1.0, 1.0)]);
        let delta = req.departure_time - Utc::now();
        assert!(delta.num_seconds() >= 28 && delta.num_seconds() <= 31);
    }
}
