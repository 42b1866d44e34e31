//! Employer-side contribution calculation.

use rust_decimal::Decimal;

use crate::config::{ContributionBase, ParameterSet};
use crate::models::{ContributionBases, EmployerCost, EmployerCostLine};

/// Name of the line carrying the employer's unemployment insurance share.
pub const UNEMPLOYMENT_EMPLOYER_LINE: &str = "unemployment_employer";

/// Computes employer contributions on the bases of a finalized breakdown.
///
/// The employer's unemployment share always comes first and is levied on the
/// unemployment base. Every configured employer contribution follows in name
/// order, each levied on the base it selects.
pub fn calculate_employer_cost(bases: &ContributionBases, params: &ParameterSet) -> EmployerCost {
    let unemployment = line(
        UNEMPLOYMENT_EMPLOYER_LINE,
        ContributionBase::Unemployment,
        bases,
        params.unemployment.employer_rate,
    );

    let lines: Vec<EmployerCostLine> = std::iter::once(unemployment)
        .chain(
            params
                .employer_contributions
                .iter()
                .map(|(name, contribution)| {
                    line(name, contribution.base, bases, contribution.rate)
                }),
        )
        .collect();

    let total = lines.iter().map(|l| l.amount).sum();

    EmployerCost { lines, total }
}

fn line(
    name: &str,
    base_kind: ContributionBase,
    bases: &ContributionBases,
    rate: Decimal,
) -> EmployerCostLine {
    let base = bases.select(base_kind);
    EmployerCostLine {
        name: name.to_string(),
        base_kind,
        base,
        rate,
        amount: base * rate,
    }
}
