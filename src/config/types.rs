//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed parameter structures that are
//! deserialized from the per-country YAML files. A [`ParameterSet`] is read
//! only by the engine; every calculation receives its own immutable copy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Monthly proration applied to annual statutory bonus caps.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Default granularity the inverted gross pay is rounded up to.
pub const DEFAULT_ROUNDING_UNIT: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Metadata about a country's payroll regime.
///
/// Contains identifying information and the display names the regime uses
/// for its pension and health systems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryMetadata {
    /// The country selector (e.g., "chile").
    pub code: String,
    /// The human-readable country name.
    pub name: String,
    /// ISO currency code (e.g., "CLP").
    pub currency: String,
    /// Currency symbol used for display.
    pub currency_symbol: String,
    /// Name of the indexed unit the caps are expressed in (e.g., "UF").
    pub unit_name: String,
    /// Name of the pension system (e.g., "AFP").
    pub pension_system_name: String,
    /// Name of the public health system.
    pub public_health_name: String,
    /// Name of the private health system.
    pub private_health_name: String,
}

/// How the rate and rebate of a tax bracket combine into a liability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketConvention {
    /// `base * rate - rebate`, with the rate applied to the whole base.
    #[default]
    Rebate,
    /// Each bracket's rate applies only to the slice of base inside it.
    Marginal,
}

/// The period a tax table is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxPeriod {
    /// Bounds are monthly amounts.
    #[default]
    Monthly,
    /// Bounds are annual amounts; monthly bases are annualised first.
    Annual,
}

/// A single bracket of a progressive table.
///
/// Used both for income tax tables and for progressive pension schemes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive lower bound of the bracket.
    pub lower_bound: Decimal,
    /// Inclusive upper bound; `None` means unbounded.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// The marginal rate as a fraction (e.g., 0.04).
    pub rate: Decimal,
    /// Flat amount subtracted after applying the rate.
    #[serde(default)]
    pub rebate: Decimal,
}

impl TaxBracket {
    /// Returns true if `amount` lies within this bracket's bounds.
    pub fn contains(&self, amount: Decimal) -> bool {
        self.lower_bound <= amount && self.upper_bound.is_none_or(|upper| amount <= upper)
    }
}

/// The income tax schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSchedule {
    /// Whether brackets are rebate-style or cumulative marginal.
    #[serde(default)]
    pub convention: BracketConvention,
    /// Whether bracket bounds are monthly or annual amounts.
    #[serde(default)]
    pub period: TaxPeriod,
    /// Brackets sorted ascending, contiguous, first lower bound zero.
    pub brackets: Vec<TaxBracket>,
}

/// Flat-rate pension: each administrator charges a single rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRateScheme {
    /// Administrator name to contribution rate.
    pub administrators: BTreeMap<String, Decimal>,
    /// Administrator used when the request names none or an unknown one.
    pub default_administrator: String,
}

/// Progressive pension: marginal brackets over the capped base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressiveScheme {
    /// Name of the single public fund (e.g., "INSS").
    pub fund_name: String,
    /// Marginal contribution brackets.
    pub brackets: Vec<TaxBracket>,
}

/// Dual pension: a public fund alongside private administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualScheme {
    /// Name of the public fund (e.g., "ONP").
    pub public_fund: String,
    /// Flat rate charged by the public fund.
    pub public_rate: Decimal,
    /// Private administrator name to contribution rate.
    pub administrators: BTreeMap<String, Decimal>,
    /// Fund used when the request names none or an unknown one.
    pub default_administrator: String,
}

/// The shape of a country's pension system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum PensionSystem {
    /// Flat rate per administrator.
    FlatRate(FlatRateScheme),
    /// Progressive marginal brackets.
    Progressive(ProgressiveScheme),
    /// Public fund or private administrator.
    Dual(DualScheme),
}

/// Health contribution parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Statutory minimum contribution as a fraction of the capped base.
    pub floor_rate: Decimal,
    /// Suggested private plan cost, in indexed units.
    #[serde(default)]
    pub default_private_plan_units: Option<Decimal>,
}

/// Unemployment insurance rates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnemploymentConfig {
    /// Worker share as a fraction of the unemployment base.
    #[serde(default)]
    pub worker_rate: Decimal,
    /// Employer share as a fraction of the unemployment base.
    #[serde(default)]
    pub employer_rate: Decimal,
}

/// Taxable caps, expressed in indexed units. `None` means uncapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionCaps {
    /// Cap shared by pension and health contributions.
    #[serde(default)]
    pub pension_health: Option<Decimal>,
    /// Cap for unemployment insurance.
    #[serde(default)]
    pub unemployment: Option<Decimal>,
}

/// Statutory bonus (gratuity) parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryBonusConfig {
    /// Bonus as a fraction of gross pay.
    #[serde(default)]
    pub percentage: Decimal,
    /// Annual cap as a multiple of the minimum wage; `None` means uncapped.
    #[serde(default)]
    pub cap_factor: Option<Decimal>,
}

/// The amount an employer contribution rate is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionBase {
    /// Taxable gross capped at the pension/health cap.
    PensionHealth,
    /// Taxable gross capped at the unemployment cap.
    Unemployment,
    /// Uncapped taxable gross.
    TaxableGross,
    /// Contractual gross pay only (monthly provisions).
    GrossPay,
}

/// A named employer-side contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerContribution {
    /// Rate as a fraction of the selected base.
    pub rate: Decimal,
    /// The base the rate is applied to.
    pub base: ContributionBase,
}

/// Bounds for the net-to-gross search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Initial upper bound as a multiple of the target net.
    pub slack_factor: Decimal,
    /// Hard ceiling for upper-bound expansion, in currency.
    pub ceiling: Decimal,
    /// Maximum number of bisection steps.
    pub max_iterations: u32,
    /// Width of the gross interval at which the search stops.
    pub precision: Decimal,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            slack_factor: Decimal::from_parts(3, 0, 0, false, 0),
            ceiling: Decimal::from_parts(100_000_000, 0, 0, false, 0),
            max_iterations: 100,
            precision: Decimal::ONE,
        }
    }
}

fn default_unit_value() -> Decimal {
    Decimal::ONE
}

fn default_rounding_unit() -> Decimal {
    DEFAULT_ROUNDING_UNIT
}

/// A country's economic constants for one calculation.
///
/// The engine never mutates a parameter set. Net pay must be non-decreasing
/// in gross pay for the inversion to be correct; [`ParameterSet::validate`]
/// rejects tables that structurally break that precondition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Statutory minimum monthly wage.
    pub minimum_wage: Decimal,
    /// Currency value of one indexed unit (1 where none exists).
    #[serde(default = "default_unit_value")]
    pub unit_value: Decimal,
    /// Pension system and its administrators.
    pub pension: PensionSystem,
    /// Health contribution parameters.
    pub health: HealthConfig,
    /// Unemployment insurance rates.
    #[serde(default)]
    pub unemployment: UnemploymentConfig,
    /// Taxable caps in indexed units.
    #[serde(default)]
    pub caps: ContributionCaps,
    /// Statutory bonus parameters.
    #[serde(default)]
    pub statutory_bonus: StatutoryBonusConfig,
    /// Income tax schedule.
    pub tax: TaxSchedule,
    /// Named employer contributions.
    #[serde(default)]
    pub employer_contributions: BTreeMap<String, EmployerContribution>,
    /// Net-to-gross search bounds.
    #[serde(default)]
    pub search: SearchSettings,
    /// Granularity the inverted gross is rounded up to.
    #[serde(default = "default_rounding_unit")]
    pub rounding_unit: Decimal,
}

impl ParameterSet {
    /// Converts an amount in indexed units to currency.
    pub fn units_to_currency(&self, units: Decimal) -> Decimal {
        units * self.unit_value
    }

    /// The pension/health cap in currency, if any.
    pub fn pension_health_cap(&self) -> Option<Decimal> {
        self.caps.pension_health.map(|units| self.units_to_currency(units))
    }

    /// The unemployment cap in currency, if any.
    pub fn unemployment_cap(&self) -> Option<Decimal> {
        self.caps.unemployment.map(|units| self.units_to_currency(units))
    }

    /// The monthly statutory bonus cap in currency, if any.
    pub fn statutory_bonus_cap(&self) -> Option<Decimal> {
        self.statutory_bonus
            .cap_factor
            .map(|factor| factor * self.minimum_wage / MONTHS_PER_YEAR)
    }

    /// Returns the rate of a named employer contribution, or zero if absent.
    pub fn employer_rate(&self, name: &str) -> Decimal {
        self.employer_contributions
            .get(name)
            .map(|c| c.rate)
            .unwrap_or(Decimal::ZERO)
    }
}

/// A country's complete configuration.
#[derive(Debug, Clone)]
pub struct CountryConfig {
    metadata: CountryMetadata,
    parameters: ParameterSet,
}

impl CountryConfig {
    /// Creates a new CountryConfig from its component parts.
    pub fn new(metadata: CountryMetadata, parameters: ParameterSet) -> Self {
        Self {
            metadata,
            parameters,
        }
    }

    /// Returns the country metadata.
    pub fn metadata(&self) -> &CountryMetadata {
        &self.metadata
    }

    /// Returns the country's parameter set.
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }
}
