//! Runtime configuration, loaded from environment variables.
//!
//! Mirrors the teacher's convention of resolving credentials and bind
//! options from `std::env::var` with sane defaults at startup
//! (`agentic/backend.rs`, `bin/agentic_server.rs`).

use std::time::Duration;

use crate::error::{TriadError, TriadResult};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub bind_port: u16,

    pub strategist_api_key: String,
    pub planner_api_key: String,
    pub validator_api_key: String,
    pub geocoder_api_key: String,
    pub places_api_key: String,
    pub routes_api_key: String,

    pub strategist_model_id: String,
    pub planner_model_id: String,
    pub validator_model_id: String,

    pub phase1_deadline: Duration,
    pub phase2_deadline: Duration,
    pub phase3_deadline: Duration,
    pub total_budget: Duration,

    pub retry_cooldown: Duration,
    pub venue_catalog_seed_path: Option<String>,
}

impl Config {
    pub fn from_env() -> TriadResult<Self> {
        let _ = dotenvy::dotenv();

        let required = |name: &str| -> TriadResult<String> {
            std::env::var(name)
                .map_err(|_| TriadError::InvalidInput(format!("missing required env var {name}")))
        };

        let duration_secs = |name: &str, default: u64| -> TriadResult<Duration> {
            match std::env::var(name) {
                Ok(v) => v
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| TriadError::InvalidInput(format!("{name} must be an integer"))),
                Err(_) => Ok(Duration::from_secs(default)),
            }
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
            bind_port: std::env::var("BIND_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),

            strategist_api_key: required("STRATEGIST_API_KEY")?,
            planner_api_key: required("PLANNER_API_KEY")?,
            validator_api_key: required("VALIDATOR_API_KEY")?,
            geocoder_api_key: required("GEOCODER_API_KEY")?,
            places_api_key: required("PLACES_API_KEY")?,
            routes_api_key: required("ROUTES_API_KEY")?,

            strategist_model_id: std::env::var("STRATEGIST_MODEL_ID")
                .unwrap_or_else(|_| "strategist-v1".to_string()),
            planner_model_id: std::env::var("PLANNER_MODEL_ID")
                .unwrap_or_else(|_| "planner-v1".to_string()),
            validator_model_id: std::env::var("VALIDATOR_MODEL_ID")
                .unwrap_or_else(|_| "validator-v1".to_string()),

            phase1_deadline: duration_secs("PHASE1_DEADLINE_SECS", 30)?,
            phase2_deadline: duration_secs("PHASE2_DEADLINE_SECS", 20)?,
            phase3_deadline: duration_secs("PHASE3_DEADLINE_SECS", 40)?,
            total_budget: duration_secs("TOTAL_BUDGET_SECS", 90)?,

            retry_cooldown: duration_secs("RETRY_COOLDOWN_SECS", 30)?,
            venue_catalog_seed_path: std::env::var("VENUE_CATALOG_SEED_PATH").ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_var_is_invalid_input() {
        std::env::remove_var("DATABASE_URL");
        let err = Config::from_env().unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }
}
