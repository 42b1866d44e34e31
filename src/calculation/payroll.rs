//! End-to-end payroll calculation.
//!
//! [`calculate_payroll`] ties the stages together: it runs the forward
//! simulation directly or through the net-to-gross search, computes employer
//! costs and assembles a [`CalculationResult`] with an audit trace.

use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::config::{ParameterProvider, ParameterSet, normalize_country_code};
use crate::error::EngineResult;
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, CalculationResult, ComputationRequest, Direction,
    EmployerCost, EmployerCostLine, HealthPlan, InversionSummary, PayBreakdown,
    WARNING_INVERSION_APPROXIMATE, WARNING_PENSION_FALLBACK, WARNING_SEARCH_CEILING,
};

use super::employer_cost::calculate_employer_cost;
use super::forward::simulate;
use super::inverse::{Inversion, invert};
use super::rounding::{Reconciliation, finalize, round_currency};

/// Collects audit steps and warnings in order.
struct AuditLog {
    steps: Vec<AuditStep>,
    warnings: Vec<AuditWarning>,
}

impl AuditLog {
    fn new() -> Self {
        Self {
            steps: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn step(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        self.steps.push(AuditStep {
            step_number: self.steps.len() as u32 + 1,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            input,
            output,
            reasoning,
        });
    }

    fn warn(&mut self, code: &str, message: String, severity: &str) {
        self.warnings.push(AuditWarning {
            code: code.to_string(),
            message,
            severity: severity.to_string(),
        });
    }
}

fn text(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Calculates payroll for a request against a parameter set.
///
/// # Errors
///
/// - [`crate::error::EngineError::InvalidParameters`] when the parameter set
///   is structurally invalid
/// - [`crate::error::EngineError::InvalidRequest`] when the request fails
///   validation
///
/// An approximate inversion or a pension administrator fallback is reported
/// through warnings in the audit trace, not as an error.
///
/// # Examples
///
/// ```no_run
/// use payroll_engine::calculation::calculate_payroll;
/// use payroll_engine::config::{ConfigLoader, ParameterProvider};
/// use payroll_engine::models::ComputationRequest;
/// use rust_decimal::Decimal;
///
/// let params = ConfigLoader::load("./config")?.get_parameters("chile")?;
/// let request = ComputationRequest::net_to_gross(Decimal::new(600_000, 0));
/// let result = calculate_payroll(&request, &params)?;
/// assert_eq!(result.gross_pay, Decimal::new(587_000, 0));
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn calculate_payroll(
    request: &ComputationRequest,
    params: &ParameterSet,
) -> EngineResult<CalculationResult> {
    let start_time = Instant::now();
    params.validate()?;
    request.validate()?;

    let mut audit = AuditLog::new();

    let (breakdown, gross_exact, reconciliation) = match request.direction {
        Direction::GrossToNet => {
            let breakdown = simulate(request.target_amount, request, params)?;
            (breakdown, request.target_amount, None)
        }
        Direction::NetToGross => {
            let inversion = invert(request.target_amount, request, params)?;
            record_inversion(&mut audit, &inversion, params);

            let reconciliation = finalize(&inversion, request.target_amount, request, params)?;
            record_rounding(&mut audit, &reconciliation, params);

            let summary = InversionSummary {
                target_net: request.target_amount,
                gross_exact: inversion.gross_exact.round_dp(2),
                rounding_unit: params.rounding_unit,
                iterations: inversion.iterations,
                converged: inversion.converged,
                ceiling_reached: inversion.ceiling_reached,
            };
            (
                reconciliation.breakdown.clone(),
                inversion.gross_exact,
                Some((summary, reconciliation.residual)),
            )
        }
    };

    record_breakdown(&mut audit, &breakdown, request, params);

    let employer_cost = calculate_employer_cost(&breakdown.contribution_bases(), params);
    record_employer_cost(&mut audit, &employer_cost);

    let (inversion, residual) = match reconciliation {
        Some((summary, residual)) => (Some(summary), Some(round_currency(residual))),
        None => (None, None),
    };

    let duration_us = start_time.elapsed().as_micros() as u64;
    debug!(
        direction = ?request.direction,
        gross = %breakdown.gross_pay,
        net = %breakdown.net_pay,
        duration_us,
        "Payroll calculation finished"
    );

    Ok(CalculationResult {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        country: None,
        direction: request.direction,
        gross_pay: round_currency(breakdown.gross_pay),
        gross_exact: gross_exact.round_dp(2),
        statutory_bonus: round_currency(breakdown.statutory_bonus),
        taxable_bonuses: round_currency(breakdown.taxable_bonuses),
        non_taxable_bonuses: round_currency(breakdown.non_taxable_bonuses),
        transport_allowance: round_currency(breakdown.transport_allowance),
        taxable_gross: round_currency(breakdown.taxable_gross),
        total_earnings: round_currency(breakdown.total_earnings),
        pension: round_currency(breakdown.pension.amount),
        pension_administrator: breakdown.pension.administrator.clone(),
        health: round_currency(breakdown.health),
        unemployment: round_currency(breakdown.unemployment),
        tax: round_currency(breakdown.tax),
        total_deductions: round_currency(breakdown.total_deductions),
        net_pay: round_currency(breakdown.net_pay),
        residual,
        employer_costs: employer_cost
            .lines
            .iter()
            .map(|line| EmployerCostLine {
                name: line.name.clone(),
                base_kind: line.base_kind,
                base: round_currency(line.base),
                rate: line.rate,
                amount: round_currency(line.amount),
            })
            .collect(),
        employer_cost_total: round_currency(employer_cost.total),
        total_cost_of_employment: round_currency(
            employer_cost.total_cost_of_employment(breakdown.total_earnings),
        ),
        inversion,
        audit_trace: AuditTrace {
            steps: audit.steps,
            warnings: audit.warnings,
            duration_us,
        },
    })
}

/// Fetches the country's parameters from `provider` and calculates payroll.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::CountryNotFound`] for an unknown
/// country, plus every error of [`calculate_payroll`].
pub fn calculate_for_country(
    provider: &dyn ParameterProvider,
    country: &str,
    request: &ComputationRequest,
) -> EngineResult<CalculationResult> {
    let params = provider.get_parameters(country)?;
    let mut result = calculate_payroll(request, &params)?;
    result.country = Some(normalize_country_code(country));
    Ok(result)
}

fn record_inversion(audit: &mut AuditLog, inversion: &Inversion, params: &ParameterSet) {
    audit.step(
        "net_to_gross_search",
        "Net-to-Gross Search",
        serde_json::json!({
            "target_net": text(inversion.target_net),
            "slack_factor": text(params.search.slack_factor),
            "ceiling": text(params.search.ceiling),
            "max_iterations": params.search.max_iterations,
            "precision": text(params.search.precision),
        }),
        serde_json::json!({
            "gross_exact": text(inversion.gross_exact.round_dp(4)),
            "net_at_exact": text(inversion.net_at_exact.round_dp(4)),
            "iterations": inversion.iterations,
            "converged": inversion.converged,
        }),
        format!(
            "Bisection over gross pay finished after {} iterations at {}",
            inversion.iterations,
            text(inversion.gross_exact.round_dp(2))
        ),
    );

    if inversion.ceiling_reached {
        audit.warn(
            WARNING_SEARCH_CEILING,
            format!(
                "Net pay at the search ceiling of {} is still below the target {}",
                text(params.search.ceiling),
                text(inversion.target_net)
            ),
            "high",
        );
    }
    if !inversion.converged {
        audit.warn(
            WARNING_INVERSION_APPROXIMATE,
            format!(
                "Search stopped after {} iterations without reaching a precision of {}; gross pay is approximate",
                inversion.iterations,
                text(params.search.precision)
            ),
            "medium",
        );
    }
}

fn record_rounding(audit: &mut AuditLog, reconciliation: &Reconciliation, params: &ParameterSet) {
    audit.step(
        "business_rounding",
        "Business Rounding",
        serde_json::json!({
            "gross_exact": text(reconciliation.gross_exact.round_dp(4)),
            "rounding_unit": text(params.rounding_unit),
        }),
        serde_json::json!({
            "gross_rounded": text(reconciliation.gross_rounded),
            "net_pay": text(reconciliation.breakdown.net_pay),
            "residual": text(reconciliation.residual),
        }),
        format!(
            "Gross rounded up to the next multiple of {}; worker receives {} above target",
            text(params.rounding_unit),
            text(reconciliation.residual)
        ),
    );
}

fn record_breakdown(
    audit: &mut AuditLog,
    b: &PayBreakdown,
    request: &ComputationRequest,
    params: &ParameterSet,
) {
    let bonus_cap = params.statutory_bonus_cap();
    audit.step(
        "statutory_bonus",
        "Statutory Bonus",
        serde_json::json!({
            "gross_pay": text(b.gross_pay),
            "percentage": text(params.statutory_bonus.percentage),
            "monthly_cap": bonus_cap.map(|cap| text(cap.round_dp(2))),
        }),
        serde_json::json!({ "statutory_bonus": text(b.statutory_bonus) }),
        match bonus_cap {
            Some(cap) if b.statutory_bonus >= cap && cap > Decimal::ZERO => {
                format!("Capped at {} a month", text(cap.round_dp(2)))
            }
            _ => format!(
                "{} x {} = {}",
                text(b.gross_pay),
                text(params.statutory_bonus.percentage),
                text(b.statutory_bonus)
            ),
        },
    );

    audit.step(
        "taxable_gross",
        "Taxable Gross",
        serde_json::json!({
            "gross_pay": text(b.gross_pay),
            "statutory_bonus": text(b.statutory_bonus),
            "taxable_bonuses": text(b.taxable_bonuses),
        }),
        serde_json::json!({ "taxable_gross": text(b.taxable_gross) }),
        format!(
            "{} + {} + {} = {}",
            text(b.gross_pay),
            text(b.statutory_bonus),
            text(b.taxable_bonuses),
            text(b.taxable_gross)
        ),
    );

    audit.step(
        "contribution_bases",
        "Capped Contribution Bases",
        serde_json::json!({
            "taxable_gross": text(b.taxable_gross),
            "pension_health_cap": params.pension_health_cap().map(text),
            "unemployment_cap": params.unemployment_cap().map(text),
        }),
        serde_json::json!({
            "pension_health_base": text(b.pension_health_base),
            "unemployment_base": text(b.unemployment_base),
        }),
        "Taxable gross limited independently by each cap".to_string(),
    );

    audit.step(
        "pension",
        "Pension Contribution",
        serde_json::json!({
            "base": text(b.pension_health_base),
            "requested_administrator": request.pension_administrator,
        }),
        serde_json::json!({
            "pension": text(b.pension.amount),
            "administrator": b.pension.administrator,
            "rate": text(b.pension.rate.round_dp(6)),
        }),
        format!(
            "{} at {} = {}",
            b.pension.administrator,
            text(b.pension.rate.round_dp(6)),
            text(b.pension.amount)
        ),
    );
    if b.pension.fallback_applied {
        audit.warn(
            WARNING_PENSION_FALLBACK,
            format!(
                "Unknown pension administrator '{}'; used '{}' instead",
                request.pension_administrator.as_deref().unwrap_or_default(),
                b.pension.administrator
            ),
            "medium",
        );
    }

    let plan = match request.health_plan {
        HealthPlan::Public => serde_json::json!({ "type": "public" }),
        HealthPlan::Private { plan_cost_units } => serde_json::json!({
            "type": "private",
            "plan_cost_units": text(plan_cost_units),
        }),
    };
    audit.step(
        "health",
        "Health Contribution",
        serde_json::json!({
            "base": text(b.pension_health_base),
            "floor_rate": text(params.health.floor_rate),
            "plan": plan,
        }),
        serde_json::json!({ "health": text(b.health) }),
        format!("Health contribution of {}", text(b.health)),
    );

    audit.step(
        "unemployment",
        "Unemployment Insurance",
        serde_json::json!({
            "base": text(b.unemployment_base),
            "worker_rate": text(params.unemployment.worker_rate),
        }),
        serde_json::json!({ "unemployment": text(b.unemployment) }),
        format!(
            "{} x {} = {}",
            text(b.unemployment_base),
            text(params.unemployment.worker_rate),
            text(b.unemployment)
        ),
    );

    audit.step(
        "income_tax",
        "Income Tax",
        serde_json::json!({
            "taxable_income": text(b.taxable_income),
            "convention": params.tax.convention,
            "period": params.tax.period,
        }),
        serde_json::json!({ "tax": text(b.tax) }),
        format!(
            "Tax on {} = {}",
            text(b.taxable_income),
            text(b.tax)
        ),
    );

    audit.step(
        "net_pay",
        "Net Pay",
        serde_json::json!({
            "total_earnings": text(b.total_earnings),
            "total_deductions": text(b.total_deductions),
        }),
        serde_json::json!({ "net_pay": text(b.net_pay) }),
        format!(
            "{} - {} = {}",
            text(b.total_earnings),
            text(b.total_deductions),
            text(b.net_pay)
        ),
    );
}

fn record_employer_cost(audit: &mut AuditLog, cost: &EmployerCost) {
    let lines: Vec<serde_json::Value> = cost
        .lines
        .iter()
        .map(|line| {
            serde_json::json!({
                "name": line.name,
                "base": text(line.base),
                "rate": text(line.rate),
                "amount": text(line.amount),
            })
        })
        .collect();

    audit.step(
        "employer_cost",
        "Employer Contributions",
        serde_json::json!({ "lines": lines }),
        serde_json::json!({ "total": text(cost.total) }),
        format!("{} employer contributions totalling {}", cost.lines.len(), text(cost.total)),
    );
}
