//! Core data models for the payroll engine.
//!
//! This module contains the request, breakdown and result types used
//! throughout the engine.

mod breakdown;
mod calculation_result;
mod request;

pub use breakdown::{
    ContributionBases, EmployerCost, EmployerCostLine, PayBreakdown, PensionContribution,
};
pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, CalculationResult, InversionSummary,
    WARNING_INVERSION_APPROXIMATE, WARNING_PENSION_FALLBACK, WARNING_SEARCH_CEILING,
};
pub use request::{Bonus, ComputationRequest, Direction, HealthPlan, MAX_AMOUNT};
