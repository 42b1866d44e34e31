//! Gross-to-net simulation.
//!
//! [`simulate`] is the forward function the whole engine is built on. It is
//! pure: the same gross, request and parameter set always produce the same
//! breakdown, which is what allows the net-to-gross search to call it
//! repeatedly.

use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::error::{EngineError, EngineResult};
use crate::models::{ComputationRequest, MAX_AMOUNT, PayBreakdown};

use super::contributions::{
    calculate_health, calculate_unemployment, pension_health_base, unemployment_base,
};
use super::statutory_bonus::calculate_statutory_bonus;

/// Computes the full pay breakdown for a contractual gross pay.
///
/// The stages run in a fixed order:
///
/// 1. Bonuses are split into taxable and non-taxable sums.
/// 2. The statutory bonus is computed from the gross pay.
/// 3. Taxable gross is gross pay plus statutory bonus plus taxable bonuses.
/// 4. The pension/health and unemployment bases are capped independently.
/// 5. Pension, health and unemployment are levied on their bases.
/// 6. Tax is levied on taxable gross less those three contributions.
/// 7. Net pay is total earnings less total deductions.
///
/// The direction and target amount of `request` are ignored; only its
/// bonuses, transport allowance, health plan and pension administrator are
/// used.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRequest`] for a gross pay that is negative
/// or above [`MAX_AMOUNT`], or for an invalid request component.
///
/// # Examples
///
/// ```no_run
/// use payroll_engine::calculation::simulate;
/// use payroll_engine::config::{ConfigLoader, ParameterProvider};
/// use payroll_engine::models::ComputationRequest;
/// use rust_decimal::Decimal;
///
/// let params = ConfigLoader::load("./config")?.get_parameters("chile")?;
/// let gross = Decimal::new(700_000, 0);
/// let breakdown = simulate(gross, &ComputationRequest::gross_to_net(gross), &params)?;
/// assert_eq!(breakdown.net_pay, Decimal::new(7_167_125, 1));
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn simulate(
    gross_pay: Decimal,
    request: &ComputationRequest,
    params: &ParameterSet,
) -> EngineResult<PayBreakdown> {
    if gross_pay < Decimal::ZERO {
        return Err(EngineError::invalid_request(
            "gross_pay",
            format!("must not be negative, found {}", gross_pay),
        ));
    }
    if gross_pay > MAX_AMOUNT {
        return Err(EngineError::invalid_request(
            "gross_pay",
            format!("must not exceed {}, found {}", MAX_AMOUNT, gross_pay),
        ));
    }
    request.validate_components()?;

    let taxable_bonuses = request.taxable_bonus_sum();
    let non_taxable_bonuses = request.non_taxable_bonus_sum();

    let statutory_bonus = calculate_statutory_bonus(gross_pay, params);
    let taxable_gross = gross_pay + statutory_bonus + taxable_bonuses;

    let pension_health_base = pension_health_base(taxable_gross, params);
    let unemployment_base = unemployment_base(taxable_gross, params);

    let pension = params
        .pension
        .as_scheme()
        .compute_pension_contribution(pension_health_base, request.pension_administrator.as_deref());
    let health = calculate_health(pension_health_base, &request.health_plan, params);
    let unemployment = calculate_unemployment(unemployment_base, params);

    let taxable_income = taxable_gross - pension.amount - health - unemployment;
    let tax = params.tax.tax_for(taxable_income);

    let total_earnings = taxable_gross + request.transport_allowance + non_taxable_bonuses;
    let total_deductions = pension.amount + health + unemployment + tax;
    let net_pay = total_earnings - total_deductions;

    Ok(PayBreakdown {
        gross_pay,
        taxable_bonuses,
        non_taxable_bonuses,
        transport_allowance: request.transport_allowance,
        statutory_bonus,
        taxable_gross,
        pension_health_base,
        unemployment_base,
        pension,
        health,
        unemployment,
        taxable_income,
        tax,
        total_earnings,
        total_deductions,
        net_pay,
    })
}
