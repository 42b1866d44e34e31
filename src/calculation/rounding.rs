//! Business rounding of an inverted gross pay.
//!
//! The exact gross from the search is rounded up to the next multiple of the
//! country's rounding unit, then simulated again so every reported figure is
//! the true breakdown of the rounded gross.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ParameterSet;
use crate::error::EngineResult;
use crate::models::{ComputationRequest, PayBreakdown};

use super::forward::simulate;
use super::inverse::Inversion;

/// Rounds `value` up to the next multiple of `unit`.
///
/// Values at or below zero round to zero. A non-positive unit leaves the
/// value unchanged.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_up_to_unit;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let unit = Decimal::new(1000, 0);
/// let rounded = round_up_to_unit(Decimal::from_str("586009.03").unwrap(), unit);
/// assert_eq!(rounded, Decimal::new(587_000, 0));
/// ```
pub fn round_up_to_unit(value: Decimal, unit: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if unit <= Decimal::ZERO {
        return value;
    }
    (value / unit).ceil() * unit
}

/// Rounds a currency amount to whole units, halves away from zero.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// A rounded gross pay and its recomputed breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// The unrounded gross from the search.
    pub gross_exact: Decimal,
    /// The gross after rounding up to the rounding unit.
    pub gross_rounded: Decimal,
    /// Breakdown recomputed at `gross_rounded`.
    pub breakdown: PayBreakdown,
    /// Net pay at the rounded gross minus the requested net.
    pub residual: Decimal,
}

/// Rounds an inversion's gross up and recomputes the breakdown.
///
/// The residual is how much more net pay the worker receives than requested.
/// The search stops within its precision of the exact threshold, so its
/// centre can sit just below it; when the rounded gross still pays less than
/// the target and the search converged, the next unit up is used instead.
pub fn finalize(
    inversion: &Inversion,
    target_net: Decimal,
    request: &ComputationRequest,
    params: &ParameterSet,
) -> EngineResult<Reconciliation> {
    let unit = params.rounding_unit;
    let mut gross_rounded = round_up_to_unit(inversion.gross_exact, unit);
    let mut breakdown = simulate(gross_rounded, request, params)?;

    if inversion.converged && breakdown.net_pay < target_net {
        debug!(
            gross = %gross_rounded,
            net = %breakdown.net_pay,
            target = %target_net,
            "Rounded gross falls short of target, stepping up one unit"
        );
        gross_rounded += unit;
        breakdown = simulate(gross_rounded, request, params)?;
    }

    let residual = breakdown.net_pay - target_net;

    Ok(Reconciliation {
        gross_exact: inversion.gross_exact,
        gross_rounded,
        breakdown,
        residual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::inverse::invert;
    use crate::config::fixtures::chile_parameters;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_up_to_unit() {
        let unit = dec("1000");

        assert_eq!(round_up_to_unit(dec("586009.03"), unit), dec("587000"));
        assert_eq!(round_up_to_unit(dec("0.01"), unit), dec("1000"));
    }

    #[test]
    fn test_exact_multiple_is_unchanged() {
        assert_eq!(round_up_to_unit(dec("586000"), dec("1000")), dec("586000"));
    }

    #[test]
    fn test_non_positive_values_round_to_zero() {
        assert_eq!(round_up_to_unit(Decimal::ZERO, dec("1000")), Decimal::ZERO);
        assert_eq!(round_up_to_unit(dec("-5"), dec("1000")), Decimal::ZERO);
    }

    #[test]
    fn test_round_currency_halves_away_from_zero() {
        assert_eq!(round_currency(dec("91787.5")), dec("91788"));
        assert_eq!(round_currency(dec("1014.625")), dec("1015"));
        assert_eq!(round_currency(dec("-0.5")), dec("-1"));
        assert_eq!(round_currency(dec("716712.4")), dec("716712"));
    }

    #[test]
    fn test_finalize_600000_rounds_to_587000() {
        let params = chile_parameters();
        let target = dec("600000");
        let request = ComputationRequest::net_to_gross(target);

        let inversion = invert(target, &request, &params).unwrap();
        let reconciliation = finalize(&inversion, target, &request, &params).unwrap();

        assert_eq!(reconciliation.gross_rounded, dec("587000"));
        assert_eq!(reconciliation.breakdown.net_pay, dec("601014.625"));
        assert_eq!(reconciliation.residual, dec("1014.625"));
        assert!(reconciliation.gross_rounded >= reconciliation.gross_exact);
    }

    #[test]
    fn test_one_unit_below_rounded_gross_misses_target() {
        let params = chile_parameters();
        let request = ComputationRequest::net_to_gross(dec("600000"));

        let below = simulate(dec("586000"), &request, &params).unwrap();

        assert_eq!(below.net_pay, dec("599990.75"));
        assert!(below.net_pay < dec("600000"));
    }

    #[test]
    fn test_converged_centre_below_threshold_steps_up() {
        let params = chile_parameters();
        let target = dec("600000");
        let request = ComputationRequest::net_to_gross(target);

        // Net pay at exactly 586,000 is 599,990.75, so a centre sitting on the
        // multiple itself must not be accepted.
        let inversion = Inversion {
            target_net: target,
            gross_exact: dec("586000"),
            net_at_exact: dec("599990.75"),
            iterations: 20,
            converged: true,
            ceiling_reached: false,
        };
        let reconciliation = finalize(&inversion, target, &request, &params).unwrap();

        assert_eq!(reconciliation.gross_rounded, dec("587000"));
        assert!(reconciliation.residual >= Decimal::ZERO);
    }
}
