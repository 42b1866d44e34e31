//! Income tax resolution.
//!
//! Two bracket conventions are supported:
//!
//! - **Rebate**: the rate of the bracket containing the base applies to the
//!   whole base and a flat rebate is subtracted (`base * rate - rebate`).
//!   Rebates are chosen so the liability is continuous across bounds.
//! - **Marginal**: each bracket's rate applies only to the slice of the base
//!   that falls inside it.
//!
//! Both functions are total: any base, including zero, negative or one that
//! falls in a one-cent gap between published bounds, yields a non-negative tax.

use rust_decimal::Decimal;
use tracing::trace;

use crate::config::{BracketConvention, MONTHS_PER_YEAR, TaxBracket, TaxPeriod, TaxSchedule};

/// Finds the bracket that applies to `taxable_base`.
///
/// Returns the bracket whose inclusive bounds contain the base. When none
/// does (the base lies in a gap between two published bounds) the last
/// bracket whose lower bound is at or below the base is used. Returns `None`
/// only for an empty table or a base below the first lower bound.
pub fn resolve_bracket(
    taxable_base: Decimal,
    brackets: &[TaxBracket],
) -> Option<(usize, &TaxBracket)> {
    if let Some(found) = brackets
        .iter()
        .enumerate()
        .find(|(_, b)| b.contains(taxable_base))
    {
        return Some(found);
    }

    let fallback = brackets
        .iter()
        .enumerate()
        .rev()
        .find(|(_, b)| b.lower_bound <= taxable_base);

    if let Some((index, _)) = fallback {
        trace!(
            base = %taxable_base,
            bracket = index,
            "No bracket contains base, using nearest lower bracket"
        );
    }
    fallback
}

/// Computes tax under the rebate convention.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::compute_tax;
/// use payroll_engine::config::TaxBracket;
/// use rust_decimal::Decimal;
///
/// let brackets = vec![
///     TaxBracket {
///         lower_bound: Decimal::ZERO,
///         upper_bound: Some(Decimal::new(1000, 0)),
///         rate: Decimal::ZERO,
///         rebate: Decimal::ZERO,
///     },
///     TaxBracket {
///         lower_bound: Decimal::new(1000, 0),
///         upper_bound: None,
///         rate: Decimal::new(10, 2),
///         rebate: Decimal::new(100, 0),
///     },
/// ];
///
/// assert_eq!(compute_tax(Decimal::new(3000, 0), &brackets), Decimal::new(200, 0));
/// assert_eq!(compute_tax(Decimal::new(-5, 0), &brackets), Decimal::ZERO);
/// ```
pub fn compute_tax(taxable_base: Decimal, brackets: &[TaxBracket]) -> Decimal {
    if taxable_base <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    match resolve_bracket(taxable_base, brackets) {
        Some((_, bracket)) => (taxable_base * bracket.rate - bracket.rebate).max(Decimal::ZERO),
        None => Decimal::ZERO,
    }
}

/// Computes tax under the cumulative marginal convention.
///
/// Each bracket taxes the slice between the previous bracket's upper bound
/// and its own, so shared bounds and one-cent gaps are both handled.
pub fn compute_marginal_tax(taxable_base: Decimal, brackets: &[TaxBracket]) -> Decimal {
    if taxable_base <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut total = Decimal::ZERO;
    let mut previous_upper: Option<Decimal> = None;

    for bracket in brackets {
        let slice_start = previous_upper.unwrap_or(bracket.lower_bound);
        if taxable_base <= slice_start {
            break;
        }

        let slice_end = match bracket.upper_bound {
            Some(upper) => upper.min(taxable_base),
            None => taxable_base,
        };
        total += (slice_end - slice_start) * bracket.rate;

        match bracket.upper_bound {
            Some(upper) => previous_upper = Some(upper),
            None => break,
        }
    }

    total.max(Decimal::ZERO)
}

impl TaxSchedule {
    /// Monthly tax for a monthly taxable base.
    ///
    /// Annual tables are applied to the annualised base and the resulting
    /// liability is spread back over twelve months.
    pub fn tax_for(&self, monthly_base: Decimal) -> Decimal {
        let base = match self.period {
            TaxPeriod::Monthly => monthly_base,
            TaxPeriod::Annual => monthly_base * MONTHS_PER_YEAR,
        };

        let tax = match self.convention {
            BracketConvention::Rebate => compute_tax(base, &self.brackets),
            BracketConvention::Marginal => compute_marginal_tax(base, &self.brackets),
        };

        match self.period {
            TaxPeriod::Monthly => tax,
            TaxPeriod::Annual => tax / MONTHS_PER_YEAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::{chile_brackets, flat_table};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn peru_brackets() -> Vec<TaxBracket> {
        flat_table(&[
            ("0", Some("25750"), "0.08"),
            ("25750", Some("103000"), "0.14"),
            ("103000", Some("180250"), "0.17"),
            ("180250", Some("231750"), "0.20"),
            ("231750", None, "0.30"),
        ])
    }

    #[test]
    fn test_zero_and_negative_base_pay_no_tax() {
        let brackets = chile_brackets();

        assert_eq!(compute_tax(Decimal::ZERO, &brackets), Decimal::ZERO);
        assert_eq!(compute_tax(dec("-100"), &brackets), Decimal::ZERO);
        assert_eq!(compute_marginal_tax(dec("-100"), &brackets), Decimal::ZERO);
    }

    #[test]
    fn test_exempt_bracket_pays_no_tax() {
        let brackets = chile_brackets();

        assert_eq!(compute_tax(dec("716712.5"), &brackets), Decimal::ZERO);
        assert_eq!(compute_tax(dec("938817.00"), &brackets), Decimal::ZERO);
    }

    #[test]
    fn test_second_bracket_applies_rate_minus_rebate() {
        // 1,500,000 * 0.04 - 37,552.68
        assert_eq!(compute_tax(dec("1500000"), &chile_brackets()), dec("22447.32"));
    }

    #[test]
    fn test_tax_is_continuous_across_bracket_bound() {
        let brackets = chile_brackets();

        let below = compute_tax(dec("2086260.00"), &brackets);
        let above = compute_tax(dec("2086260.01"), &brackets);

        assert_eq!(below, dec("45897.72"));
        assert!(above - below < dec("0.01"));
    }

    #[test]
    fn test_base_in_cent_gap_uses_lower_bracket() {
        let brackets = chile_brackets();

        let (index, _) = resolve_bracket(dec("938817.005"), &brackets).unwrap();
        assert_eq!(index, 0);
        assert_eq!(compute_tax(dec("938817.005"), &brackets), Decimal::ZERO);
    }

    #[test]
    fn test_top_bracket_is_unbounded() {
        // 30,000,000 * 0.40 - 2,699,620.44
        assert_eq!(compute_tax(dec("30000000"), &chile_brackets()), dec("9300379.56"));
    }

    #[test]
    fn test_empty_table_yields_zero() {
        assert_eq!(compute_tax(dec("1000"), &[]), Decimal::ZERO);
        assert!(resolve_bracket(dec("1000"), &[]).is_none());
    }

    #[test]
    fn test_marginal_tax_sums_slices() {
        // 25,750 * 0.08 + 77,250 * 0.14 + 17,000 * 0.17
        assert_eq!(compute_marginal_tax(dec("120000"), &peru_brackets()), dec("15765"));
    }

    #[test]
    fn test_marginal_tax_within_first_bracket() {
        assert_eq!(compute_marginal_tax(dec("10000"), &peru_brackets()), dec("800"));
    }

    #[test]
    fn test_annual_schedule_annualises_and_prorates() {
        let schedule = TaxSchedule {
            convention: BracketConvention::Marginal,
            period: TaxPeriod::Annual,
            brackets: peru_brackets(),
        };

        // 10,000 a month is 120,000 a year, taxed 15,765 a year.
        assert_eq!(schedule.tax_for(dec("10000")), dec("1313.75"));
    }

    #[test]
    fn test_monthly_rebate_schedule_matches_compute_tax() {
        let schedule = TaxSchedule {
            convention: BracketConvention::Rebate,
            period: TaxPeriod::Monthly,
            brackets: chile_brackets(),
        };

        assert_eq!(schedule.tax_for(dec("1500000")), dec("22447.32"));
    }
}
