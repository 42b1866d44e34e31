//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::calculate_for_country;
use crate::config::CountryMetadata;
use crate::error::EngineError;

use super::request::CalculationRequest;
use super::response::{ApiError, ApiErrorResponse, CountryDetails};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/countries", get(list_countries_handler))
        .route("/countries/:code", get(country_details_handler))
        .with_state(state)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

fn error_response(api_error: ApiErrorResponse) -> Response {
    json_response(api_error.status, api_error.error)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts a calculation request and returns the calculated payroll result.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") || body_text.contains("unknown variant")
                    {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return json_response(StatusCode::BAD_REQUEST, error);
        }
    };

    let (country, request) = request.into_parts();

    let start_time = Instant::now();
    match calculate_for_country(state.config(), &country, &request) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                country = %country,
                direction = ?result.direction,
                gross_pay = %result.gross_pay,
                net_pay = %result.net_pay,
                warnings = result.audit_trace.warnings.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                country = %country,
                error = %err,
                "Calculation failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for GET /countries endpoint.
///
/// Lists the metadata of every loaded country, ordered by code.
async fn list_countries_handler(State(state): State<AppState>) -> Response {
    let countries: Vec<CountryMetadata> = state.config().countries().cloned().collect();
    json_response(StatusCode::OK, countries)
}

/// Handler for GET /countries/:code endpoint.
///
/// Describes one country: its metadata, pension administrators and the
/// constants a client needs to build a request.
async fn country_details_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Response {
    let country = match state.config().get_country(&code) {
        Ok(country) => country,
        Err(err @ EngineError::CountryNotFound { .. }) => {
            warn!(country = %code, "Country not found");
            let mut api_error: ApiErrorResponse = err.into();
            api_error.status = StatusCode::NOT_FOUND;
            return error_response(api_error);
        }
        Err(err) => return error_response(err.into()),
    };

    let params = country.parameters();
    let scheme = params.pension.as_scheme();
    let details = CountryDetails {
        metadata: country.metadata().clone(),
        pension_administrators: scheme.administrators(),
        default_pension_administrator: scheme.default_administrator().to_string(),
        unit_value: params.unit_value,
        default_private_plan_units: params.health.default_private_plan_units,
        minimum_wage: params.minimum_wage,
        rounding_unit: params.rounding_unit,
    };

    json_response(StatusCode::OK, details)
}
