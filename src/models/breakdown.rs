//! Exact (unrounded) breakdown models produced by the calculation stages.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ContributionBase;

/// The pension contribution for one calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionContribution {
    /// The contribution amount.
    pub amount: Decimal,
    /// The administrator or fund actually applied.
    pub administrator: String,
    /// The effective rate (amount over base; zero for a zero base).
    pub rate: Decimal,
    /// True when the requested administrator was unknown and the default
    /// administrator was used instead.
    pub fallback_applied: bool,
}

/// The amounts contributions can be levied on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionBases {
    /// Taxable gross capped at the pension/health cap.
    pub pension_health: Decimal,
    /// Taxable gross capped at the unemployment cap.
    pub unemployment: Decimal,
    /// Uncapped taxable gross.
    pub taxable_gross: Decimal,
    /// Contractual gross pay.
    pub gross_pay: Decimal,
}

impl ContributionBases {
    /// Returns the base an employer contribution is levied on.
    pub fn select(&self, base: ContributionBase) -> Decimal {
        match base {
            ContributionBase::PensionHealth => self.pension_health,
            ContributionBase::Unemployment => self.unemployment,
            ContributionBase::TaxableGross => self.taxable_gross,
            ContributionBase::GrossPay => self.gross_pay,
        }
    }
}

/// Full exact breakdown of one gross-to-net simulation.
///
/// All figures are in currency at full precision; rounding happens only when
/// the result record is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayBreakdown {
    /// Contractual gross pay.
    pub gross_pay: Decimal,
    /// Sum of taxable bonuses.
    pub taxable_bonuses: Decimal,
    /// Sum of non-taxable bonuses.
    pub non_taxable_bonuses: Decimal,
    /// Transport allowance (never taxable).
    pub transport_allowance: Decimal,
    /// Statutory bonus after its cap.
    pub statutory_bonus: Decimal,
    /// Gross pay plus statutory bonus plus taxable bonuses.
    pub taxable_gross: Decimal,
    /// Taxable gross capped for pension and health.
    pub pension_health_base: Decimal,
    /// Taxable gross capped for unemployment insurance.
    pub unemployment_base: Decimal,
    /// Worker pension contribution.
    pub pension: PensionContribution,
    /// Worker health contribution.
    pub health: Decimal,
    /// Worker unemployment insurance.
    pub unemployment: Decimal,
    /// Taxable gross less worker contributions.
    pub taxable_income: Decimal,
    /// Income tax.
    pub tax: Decimal,
    /// Everything the worker earns, taxable or not.
    pub total_earnings: Decimal,
    /// Pension, health, unemployment and tax.
    pub total_deductions: Decimal,
    /// Take-home pay.
    pub net_pay: Decimal,
}

impl PayBreakdown {
    /// The bases employer contributions are levied on.
    pub fn contribution_bases(&self) -> ContributionBases {
        ContributionBases {
            pension_health: self.pension_health_base,
            unemployment: self.unemployment_base,
            taxable_gross: self.taxable_gross,
            gross_pay: self.gross_pay,
        }
    }
}

/// One employer-side contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerCostLine {
    /// Contribution name (e.g., "mutual").
    pub name: String,
    /// Which base the rate applies to.
    pub base_kind: ContributionBase,
    /// The base amount.
    pub base: Decimal,
    /// The rate.
    pub rate: Decimal,
    /// `base * rate`.
    pub amount: Decimal,
}

/// Employer-side contributions for one calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerCost {
    /// Individual contributions, unemployment share first.
    pub lines: Vec<EmployerCostLine>,
    /// Sum of every line.
    pub total: Decimal,
}

impl EmployerCost {
    /// Worker earnings plus employer contributions.
    pub fn total_cost_of_employment(&self, total_earnings: Decimal) -> Decimal {
        total_earnings + self.total
    }

    /// Returns the amount of a named line, if present.
    pub fn amount_of(&self, name: &str) -> Option<Decimal> {
        self.lines
            .iter()
            .find(|line| line.name == name)
            .map(|line| line.amount)
    }
}
