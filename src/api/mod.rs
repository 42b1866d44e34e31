//! HTTP API module for the payroll engine.
//!
//! This module provides the REST API endpoints for gross-to-net and
//! net-to-gross calculations and for describing the supported countries.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{BonusRequest, CalculationRequest};
pub use response::{ApiError, CountryDetails};
pub use state::AppState;
