//! Capped contribution bases and the health and unemployment deductions.
//!
//! Caps are expressed in indexed units and converted with the parameter
//! set's unit value. The pension/health base and the unemployment base are
//! capped independently from the same taxable gross.

use rust_decimal::Decimal;

use crate::config::ParameterSet;
use crate::models::HealthPlan;

/// Limits `amount` to `cap` when a cap is defined.
pub fn apply_cap(amount: Decimal, cap: Option<Decimal>) -> Decimal {
    match cap {
        Some(cap) => amount.min(cap),
        None => amount,
    }
}

/// Taxable gross capped for pension and health.
pub fn pension_health_base(taxable_gross: Decimal, params: &ParameterSet) -> Decimal {
    apply_cap(taxable_gross, params.pension_health_cap())
}

/// Taxable gross capped for unemployment insurance.
pub fn unemployment_base(taxable_gross: Decimal, params: &ParameterSet) -> Decimal {
    apply_cap(taxable_gross, params.unemployment_cap())
}

/// Computes the worker's health contribution.
///
/// The public plan pays the statutory floor. A private plan pays the larger
/// of the floor and the plan cost converted to currency.
///
/// # Examples
///
/// ```no_run
/// use payroll_engine::calculation::calculate_health;
/// use payroll_engine::config::{ConfigLoader, ParameterProvider};
/// use payroll_engine::models::HealthPlan;
/// use rust_decimal::Decimal;
///
/// let params = ConfigLoader::load("./config")?.get_parameters("chile")?;
/// let health = calculate_health(Decimal::new(875_000, 0), &HealthPlan::Public, &params);
/// assert_eq!(health, Decimal::new(61_250, 0));
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn calculate_health(base: Decimal, plan: &HealthPlan, params: &ParameterSet) -> Decimal {
    let floor = base.max(Decimal::ZERO) * params.health.floor_rate;

    match plan {
        HealthPlan::Public => floor,
        HealthPlan::Private { plan_cost_units } => {
            floor.max(params.units_to_currency(*plan_cost_units))
        }
    }
}

/// Computes the worker's unemployment insurance.
pub fn calculate_unemployment(base: Decimal, params: &ParameterSet) -> Decimal {
    base.max(Decimal::ZERO) * params.unemployment.worker_rate
}
