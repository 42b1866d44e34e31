//! Calculation logic for the payroll engine.
//!
//! This module contains the tax bracket resolver, the statutory bonus and
//! contribution rules, the gross-to-net simulation, the net-to-gross search
//! with its business rounding, employer costs, and the orchestration that
//! turns a request into a [`crate::models::CalculationResult`].

mod contributions;
mod employer_cost;
mod forward;
mod inverse;
mod payroll;
mod pension;
mod rounding;
mod statutory_bonus;
mod tax;

pub use contributions::{
    apply_cap, calculate_health, calculate_unemployment, pension_health_base, unemployment_base,
};
pub use employer_cost::{UNEMPLOYMENT_EMPLOYER_LINE, calculate_employer_cost};
pub use forward::simulate;
pub use inverse::{Inversion, invert};
pub use payroll::{calculate_for_country, calculate_payroll};
pub use pension::PensionScheme;
pub use rounding::{Reconciliation, finalize, round_currency, round_up_to_unit};
pub use statutory_bonus::calculate_statutory_bonus;
pub use tax::{compute_marginal_tax, compute_tax, resolve_bracket};
