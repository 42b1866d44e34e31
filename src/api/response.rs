//! Response types for the payroll engine API.
//!
//! This module defines the error response structures, the country
//! description payloads and the mapping from engine errors to HTTP statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CountryMetadata;
use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a country not found error response.
    pub fn country_not_found(code: &str) -> Self {
        Self::with_details(
            "COUNTRY_NOT_FOUND",
            format!("Country not supported: {}", code),
            "Use GET /countries to list the supported country codes",
        )
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::InvalidParameters { field, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "INVALID_PARAMETERS",
                    "Country parameters are invalid",
                    format!("{}: {}", field, message),
                ),
            },
            EngineError::CountryNotFound { code } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::country_not_found(&code),
            },
            EngineError::InvalidRequest { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "VALIDATION_ERROR",
                    format!("Invalid request field '{}': {}", field, message),
                    "The request contains invalid information",
                ),
            },
        }
    }
}

/// Response body for `GET /countries/:code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryDetails {
    /// The country's metadata.
    #[serde(flatten)]
    pub metadata: CountryMetadata,
    /// Pension administrators a worker may choose, sorted.
    pub pension_administrators: Vec<String>,
    /// Administrator used when the request names none.
    pub default_pension_administrator: String,
    /// Currency value of one indexed unit.
    pub unit_value: Decimal,
    /// Suggested private health plan cost in indexed units.
    pub default_private_plan_units: Option<Decimal>,
    /// Statutory minimum monthly wage.
    pub minimum_wage: Decimal,
    /// Granularity inverted gross pay is rounded up to.
    pub rounding_unit: Decimal,
}
