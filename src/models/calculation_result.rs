//! Calculation result models for the payroll engine.
//!
//! This module contains the [`CalculationResult`] type and its associated
//! structures. A result carries every figure rounded to whole currency units
//! plus a complete audit trace of how each figure was derived.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Direction, EmployerCostLine};

/// Warning code for an unknown pension administrator.
pub const WARNING_PENSION_FALLBACK: &str = "PENSION_ADMINISTRATOR_FALLBACK";
/// Warning code for a net-to-gross search that did not reach its precision.
pub const WARNING_INVERSION_APPROXIMATE: &str = "INVERSION_APPROXIMATE";
/// Warning code for a search whose upper bound hit the ceiling.
pub const WARNING_SEARCH_CEILING: &str = "SEARCH_CEILING_REACHED";

/// A single step in the audit trace recording a calculation stage.
///
/// Each step captures the input, output, and reasoning for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// Stable identifier of the stage (e.g., "statutory_bonus").
    pub rule_id: String,
    /// The human-readable name of the stage.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the figure.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings annotate a result that was still produced, such as an
/// approximate inversion or a pension administrator fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 1234,
/// };
/// assert!(!trace.has_warning("INVERSION_APPROXIMATE"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// Returns true if a warning with `code` was recorded.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// Outcome of the net-to-gross search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InversionSummary {
    /// The requested net pay.
    pub target_net: Decimal,
    /// Centre of the final search interval, before business rounding.
    pub gross_exact: Decimal,
    /// The rounding unit the gross was rounded up to.
    pub rounding_unit: Decimal,
    /// Bisection steps performed.
    pub iterations: u32,
    /// Whether the interval shrank below the search precision.
    pub converged: bool,
    /// Whether the upper bound had to stop at the search ceiling.
    pub ceiling_reached: bool,
}

/// The complete result of a payroll calculation.
///
/// Every currency figure is rounded to whole units. The exact gross found by
/// a net-to-gross search is kept in [`CalculationResult::gross_exact`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// Country the parameters were taken from, when known.
    pub country: Option<String>,
    /// The direction that was calculated.
    pub direction: Direction,
    /// Contractual gross pay (rounded up to the rounding unit when inverted).
    pub gross_pay: Decimal,
    /// Unrounded gross from the search; equals `gross_pay` for gross-to-net.
    pub gross_exact: Decimal,
    /// Statutory bonus.
    pub statutory_bonus: Decimal,
    /// Sum of taxable bonuses.
    pub taxable_bonuses: Decimal,
    /// Sum of non-taxable bonuses.
    pub non_taxable_bonuses: Decimal,
    /// Transport allowance.
    pub transport_allowance: Decimal,
    /// Gross pay plus statutory bonus plus taxable bonuses.
    pub taxable_gross: Decimal,
    /// Everything the worker earns.
    pub total_earnings: Decimal,
    /// Worker pension contribution.
    pub pension: Decimal,
    /// Administrator whose rate was applied.
    pub pension_administrator: String,
    /// Worker health contribution.
    pub health: Decimal,
    /// Worker unemployment insurance.
    pub unemployment: Decimal,
    /// Income tax.
    pub tax: Decimal,
    /// Pension, health, unemployment and tax.
    pub total_deductions: Decimal,
    /// Take-home pay.
    pub net_pay: Decimal,
    /// Net pay above the requested target (net-to-gross only).
    pub residual: Option<Decimal>,
    /// Employer contributions.
    pub employer_costs: Vec<EmployerCostLine>,
    /// Sum of employer contributions.
    pub employer_cost_total: Decimal,
    /// Total earnings plus employer contributions.
    pub total_cost_of_employment: Decimal,
    /// Search summary (net-to-gross only).
    pub inversion: Option<InversionSummary>,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}
