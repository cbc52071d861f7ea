//! Places metadata primitive (§4.4.2).
//!
//! TTL 24h for hours; place identity/coordinates cached indefinitely via
//! a separate identity cache layer kept by the caller. No hours value is
//! ever invented here or upstream — see Design Note "Hours invention".

use std::time::Duration;

use serde::Deserialize;

use crate::enrichment::cache::TtlCache;
use crate::enrichment::types::{BusinessHours, BusinessHoursDay, PlaceMetadata};
use crate::error::{TriadError, TriadResult};

const HOURS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct PlacesClient {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    cache: TtlCache<String, PlaceMetadata>,
}

impl PlacesClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://maps.example.com/places/v1".to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url,
            cache: TtlCache::new(Some(HOURS_TTL)),
        }
    }

    pub async fn metadata(&self, place_id: &str) -> TriadResult<PlaceMetadata> {
        if let Some(cached) = self.cache.get(&place_id.to_string()).await {
            return Ok(cached);
        }

        let metadata = self.call_api(place_id).await?;
        self.cache.put(place_id.to_string(), metadata.clone()).await;
        Ok(metadata)
    }

    async fn call_api(&self, place_id: &str) -> TriadResult<PlaceMetadata> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, place_id))
            .query(&[("key", self.api_key.clone())])
            .send()
            .await
            .map_err(|e| TriadError::EnrichmentFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(TriadError::EnrichmentFailed(format!(
                "places provider returned {status}"
            )));
        }

        #[derive(Deserialize)]
        struct ApiHoursDay {
            weekday: u8,
            open: Option<String>,
            close: Option<String>,
        }

        #[derive(Deserialize)]
        struct ApiResponse {
            display_name: String,
            formatted_address: String,
            hours: Option<Vec<ApiHoursDay>>,
            business_status: String,
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| TriadError::EnrichmentFailed(e.to_string()))?;

        let hours = match body.hours {
            Some(days) if !days.is_empty() => BusinessHours::Known(
                days.into_iter()
                    .filter_map(|d| {
                        weekday_from_index(d.weekday).map(|weekday| BusinessHoursDay {
                            weekday,
                            open: d.open,
                            close: d.close,
                        })
                    })
                    .collect(),
            ),
            _ => BusinessHours::Unknown,
        };

        Ok(PlaceMetadata {
            place_id: place_id.to_string(),
            display_name: body.display_name,
            formatted_address: body.formatted_address,
            hours,
            business_status: body.business_status,
        })
    }
}

fn weekday_from_index(idx: u8) -> Option<chrono::Weekday> {
    use chrono::Weekday::*;
    [Mon, Tue, Wed, Thu, Fri, Sat, Sun].get(idx as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_index_is_monday_first() {
        assert_eq!(weekday_from_index(0), Some(chrono::Weekday::Mon));
        assert_eq!(weekday_from_index(6), Some(chrono::Weekday::Sun));
        assert_eq!(weekday_from_index(7), None);
    }
}
