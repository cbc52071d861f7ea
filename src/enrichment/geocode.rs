//! Reverse-geocode primitive (§4.4.1).
//!
//! `reqwest`-based client following the same shape as the teacher's
//! `agentic/anthropic_client.rs`: a thin wrapper owning a `reqwest::Client`
//! and an API key, with one fallible call method. Results are cached
//! indefinitely by six-decimal coordinate key — place ids are stable.

use std::time::Duration;

use serde::Deserialize;

use crate::enrichment::cache::TtlCache;
use crate::enrichment::types::GeocodeResult;
use crate::error::{TriadError, TriadResult};
use crate::util::coords_key;

pub struct GeocodeClient {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    cache: TtlCache<String, GeocodeResult>,
}

impl GeocodeClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://maps.example.com/geocode/v1".to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url,
            // No TTL: place identity and coordinates are stable (§4.4).
            cache: TtlCache::new(None),
        }
    }

    /// Resolve `(lat, lng)` to a place id, formatted address, timezone,
    /// and locality. Bounded by `timeout`; the caller (C1) enforces the
    /// 2s synchronous bound on snapshot creation.
    pub async fn reverse_geocode(
        &self,
        lat: f64,
        lng: f64,
        timeout: Duration,
    ) -> TriadResult<GeocodeResult> {
        let key = coords_key(lat, lng);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let result = tokio::time::timeout(timeout, self.call_api(lat, lng))
            .await
            .map_err(|_| TriadError::GeocodeFailed("timed out".to_string()))??;

        self.cache.put(key, result.clone()).await;
        Ok(result)
    }

    async fn call_api(&self, lat: f64, lng: f64) -> TriadResult<GeocodeResult> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", lat.to_string()),
                ("lng", lng.to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| TriadError::GeocodeFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(TriadError::GeocodeFailed(format!(
                "provider returned {status}"
            )));
        }

        #[derive(Deserialize)]
        struct ApiResponse {
            place_id: String,
            formatted_address: String,
            timezone: String,
            city: Option<String>,
            region: Option<String>,
            country: String,
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| TriadError::GeocodeFailed(e.to_string()))?;

        Ok(GeocodeResult {
            place_id: body.place_id,
            formatted_address: body.formatted_address,
            timezone: body.timezone,
            city: body.city,
            region: body.region,
            country: body.country,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cache_hit_skips_network() {
        let client = GeocodeClient::new("test-key".to_string());
        let key = coords_key(32.8968, -97.038);
        client
            .cache
            .put(
                key,
                GeocodeResult {
                    place_id: "p1".to_string(),
                    formatted_address: "Fort Worth, TX".to_string(),
                    timezone: "America/Chicago".to_string(),
                    city: Some("Fort Worth".to_string()),
                    region: Some("TX".to_string()),
                    country: "US".to_string(),
                },
            )
            .await;

        let resolved = client
            .reverse_geocode(32.8968, -97.038, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(resolved.place_id, "p1");
        assert_eq!(resolved.country, "US");
    }
}
