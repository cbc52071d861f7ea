//! Error taxonomy for the TRIAD service.
//!
//! One variant per kind in the error taxonomy (see SPEC_FULL §7). Variants
//! carry enough context to build the `{status, code, message, attempt}`
//! shape the HTTP layer returns, without leaking provider-internal detail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum TriadError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("geocode resolution failed: {0}")]
    GeocodeFailed(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("model '{expected}' returned response for '{actual}'")]
    ModelMismatch { expected: String, actual: String },

    #[error("strategist failed: {0}")]
    StrategistFailed(String),

    #[error("planner failed: {0}")]
    PlannerFailed(String),

    #[error("validator failed: {0}")]
    ValidatorFailed(String),

    #[error("planner throttled")]
    PlannerThrottled,

    #[error("enrichment failed for venue: {0}")]
    EnrichmentFailed(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("total budget exhausted")]
    BudgetExhausted,

    #[error("job cancelled")]
    Cancelled,

    #[error("not found: {0}")]
    NotFound(String),

    /// Reconstructed from a job's persisted `error_code`/`error_message`
    /// when re-reporting a previously terminal failure (e.g. `GET
    /// /blocks/strategy/:snapshot_id` on a failed job) — the original
    /// typed variant isn't kept around, only its taxonomy code and text.
    #[error("{message}")]
    Stored { code: String, message: String },
}

impl TriadError {
    /// Machine-readable code used in logs, events, and HTTP bodies.
    pub fn code(&self) -> String {
        match self {
            Self::InvalidInput(_) => "invalid_input".to_string(),
            Self::GeocodeFailed(_) => "geocode_failed".to_string(),
            Self::StorageUnavailable(_) => "storage_unavailable".to_string(),
            Self::ModelMismatch { .. } => "model_mismatch".to_string(),
            Self::StrategistFailed(_) => "strategist_failed".to_string(),
            Self::PlannerFailed(_) => "planner_failed".to_string(),
            Self::ValidatorFailed(_) => "validator_failed".to_string(),
            Self::PlannerThrottled => "planner_throttled".to_string(),
            Self::EnrichmentFailed(_) => "enrichment_failed".to_string(),
            Self::ValidationFailed(_) => "validation_failed".to_string(),
            Self::BudgetExhausted => "budget_exhausted".to_string(),
            Self::Cancelled => "cancelled".to_string(),
            Self::NotFound(_) => "not_found".to_string(),
            Self::Stored { code, .. } => code.clone(),
        }
    }

    /// Rebuilds an error from a job's persisted `error_code`/`error_message`.
    pub fn from_code_message(code: String, message: String) -> Self {
        Self::Stored { code, message }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::GeocodeFailed(_) => StatusCode::BAD_GATEWAY,
            Self::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ModelMismatch { .. } => StatusCode::BAD_GATEWAY,
            Self::StrategistFailed(_) | Self::PlannerFailed(_) | Self::ValidatorFailed(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::PlannerThrottled => StatusCode::TOO_MANY_REQUESTS,
            Self::EnrichmentFailed(_) => StatusCode::BAD_GATEWAY,
            Self::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BudgetExhausted => StatusCode::GATEWAY_TIMEOUT,
            Self::Cancelled => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Stored { code, .. } => match code.as_str() {
                "invalid_input" => StatusCode::BAD_REQUEST,
                "planner_throttled" => StatusCode::TOO_MANY_REQUESTS,
                "validation_failed" => StatusCode::UNPROCESSABLE_ENTITY,
                "budget_exhausted" => StatusCode::GATEWAY_TIMEOUT,
                "cancelled" => StatusCode::CONFLICT,
                "not_found" => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub code: String,
    pub message: String,
    pub attempt: Option<i32>,
}

impl IntoResponse for TriadError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            status: "failed",
            code: self.code(),
            message: self.to_string(),
            attempt: None,
        };
        (status, Json(body)).into_response()
    }
}

pub type TriadResult<T> = Result<T, TriadError>;
