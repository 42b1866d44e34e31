//! Net-to-gross inversion.
//!
//! There is no closed form for the gross pay that yields a given net pay once
//! caps, bonuses and progressive brackets are involved. [`invert`] searches
//! for it by bisection over [`simulate`], relying on net pay being
//! non-decreasing in gross pay.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ParameterSet;
use crate::error::{EngineError, EngineResult};
use crate::models::{ComputationRequest, MAX_AMOUNT};

use super::forward::simulate;

const TWO: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Result of a net-to-gross search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inversion {
    /// The requested net pay.
    pub target_net: Decimal,
    /// Centre of the final search interval.
    ///
    /// The last midpoint evaluated is one end of that interval, so once the
    /// search converges the two differ by at most half the precision.
    pub gross_exact: Decimal,
    /// Net pay at `gross_exact`.
    pub net_at_exact: Decimal,
    /// Bisection steps performed.
    pub iterations: u32,
    /// True when the interval shrank to the search precision without
    /// hitting the ceiling.
    pub converged: bool,
    /// True when the upper bound was doubled past the search ceiling and its
    /// net pay was still below the target.
    pub ceiling_reached: bool,
}

/// Finds the gross pay whose net pay equals `target_net`.
///
/// The search starts with the interval `[0, target_net * slack_factor]`,
/// whatever the ceiling. If the upper bound still yields less than the target
/// it is doubled until it does; the ceiling only ends this doubling, once the
/// bound has passed it. The interval is then halved until it is no wider than
/// the precision or the iteration cap is hit. Bounds never exceed
/// [`MAX_AMOUNT`].
///
/// A search that stops early is not an error: the returned [`Inversion`]
/// reports `converged = false` and the best estimate found.
///
/// # Errors
///
/// Returns [`EngineError::InvalidRequest`] when `target_net` is not positive,
/// and propagates simulation errors for invalid request components.
///
/// # Examples
///
/// ```no_run
/// use payroll_engine::calculation::invert;
/// use payroll_engine::config::{ConfigLoader, ParameterProvider};
/// use payroll_engine::models::ComputationRequest;
/// use rust_decimal::Decimal;
///
/// let params = ConfigLoader::load("./config")?.get_parameters("chile")?;
/// let target = Decimal::new(600_000, 0);
/// let inversion = invert(target, &ComputationRequest::net_to_gross(target), &params)?;
/// assert!(inversion.converged);
/// assert!((inversion.net_at_exact - target).abs() < Decimal::new(2, 0));
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn invert(
    target_net: Decimal,
    request: &ComputationRequest,
    params: &ParameterSet,
) -> EngineResult<Inversion> {
    if target_net <= Decimal::ZERO {
        return Err(EngineError::invalid_request(
            "target_amount",
            format!("net pay target must be greater than zero, found {}", target_net),
        ));
    }

    let search = &params.search;
    let net_at = |gross: Decimal| simulate(gross, request, params).map(|b| b.net_pay);

    let mut lower = Decimal::ZERO;
    let mut upper = target_net
        .checked_mul(search.slack_factor)
        .map_or(MAX_AMOUNT, |bound| bound.min(MAX_AMOUNT));
    let mut ceiling_reached = false;

    while net_at(upper)? < target_net {
        if upper > search.ceiling || upper >= MAX_AMOUNT {
            ceiling_reached = true;
            warn!(
                target = %target_net,
                ceiling = %search.ceiling,
                upper = %upper,
                "Search ceiling reached before net pay met the target"
            );
            break;
        }
        upper = (upper * TWO).min(MAX_AMOUNT);
        debug!(upper = %upper, "Expanded search upper bound");
    }

    let mut iterations = 0;
    while iterations < search.max_iterations && upper - lower > search.precision {
        let midpoint = (lower + upper) / TWO;
        if net_at(midpoint)? < target_net {
            lower = midpoint;
        } else {
            upper = midpoint;
        }
        iterations += 1;
    }

    let converged = !ceiling_reached && upper - lower <= search.precision;
    let gross_exact = (lower + upper) / TWO;
    let net_at_exact = net_at(gross_exact)?;

    debug!(
        target = %target_net,
        gross = %gross_exact,
        iterations,
        converged,
        "Net-to-gross search finished"
    );
    if !converged {
        warn!(
            target = %target_net,
            gross = %gross_exact,
            width = %(upper - lower),
            "Net-to-gross search stopped before reaching its precision"
        );
    }

    Ok(Inversion {
        target_net,
        gross_exact,
        net_at_exact,
        iterations,
        converged,
        ceiling_reached,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::rounding::finalize;
    use crate::config::fixtures::chile_parameters;
    use crate::models::Bonus;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_inversion_recovers_known_gross() {
        let params = chile_parameters();
        let target = dec("716712.5");

        let inversion = invert(target, &ComputationRequest::net_to_gross(target), &params).unwrap();

        assert!(inversion.converged);
        assert!((inversion.gross_exact - dec("700000")).abs() <= dec("1"));
    }

    #[test]
    fn test_inversion_600000_lands_near_586009() {
        let params = chile_parameters();
        let target = dec("600000");

        let inversion = invert(target, &ComputationRequest::net_to_gross(target), &params).unwrap();

        assert!(inversion.converged);
        assert!(!inversion.ceiling_reached);
        assert!((inversion.gross_exact - dec("586009.03")).abs() <= dec("1"));
        assert!((inversion.net_at_exact - target).abs() <= dec("1.1"));
        assert!(inversion.iterations > 0);
        assert!(inversion.iterations <= params.search.max_iterations);
    }

    #[test]
    fn test_inversion_with_non_taxable_extras_needs_less_gross() {
        let params = chile_parameters();
        let target = dec("600000");

        let plain = invert(target, &ComputationRequest::net_to_gross(target), &params).unwrap();
        let request = ComputationRequest::net_to_gross(target)
            .with_bonus(Bonus::non_taxable("meals", dec("50000")));
        let with_extras = invert(target, &request, &params).unwrap();

        assert!(with_extras.gross_exact < plain.gross_exact);
    }

    #[test]
    fn test_target_covered_by_extras_converges_to_zero_gross() {
        let params = chile_parameters();
        let target = dec("50000");
        let request = ComputationRequest::net_to_gross(target).with_transport_allowance(dec("80000"));

        let inversion = invert(target, &request, &params).unwrap();

        assert!(inversion.converged);
        assert!(inversion.gross_exact <= dec("1"));
    }

    #[test]
    fn test_upper_bound_expands_when_slack_too_small() {
        let mut params = chile_parameters();
        params.search.slack_factor = dec("0.1");
        let target = dec("600000");

        let inversion = invert(target, &ComputationRequest::net_to_gross(target), &params).unwrap();

        assert!(inversion.converged);
        assert!((inversion.gross_exact - dec("586009.03")).abs() <= dec("1"));
    }

    #[test]
    fn test_unreachable_target_flags_ceiling() {
        let mut params = chile_parameters();
        params.search.slack_factor = dec("0.1");
        params.search.ceiling = dec("1000000");
        let target = dec("5000000");

        let inversion = invert(target, &ComputationRequest::net_to_gross(target), &params).unwrap();

        assert!(inversion.ceiling_reached);
        assert!(!inversion.converged);
        assert!(inversion.net_at_exact < target);
    }

    #[test]
    fn test_starting_bound_may_exceed_ceiling() {
        let params = chile_parameters();
        let target = dec("80000000");
        assert!(target * params.search.slack_factor > params.search.ceiling);

        let request = ComputationRequest::net_to_gross(target);
        let inversion = invert(target, &request, &params).unwrap();

        assert!(inversion.converged);
        assert!(!inversion.ceiling_reached);
        assert!(inversion.gross_exact > params.search.ceiling);
        assert!((inversion.net_at_exact - target).abs() <= dec("1"));

        let reconciliation = finalize(&inversion, target, &request, &params).unwrap();
        assert!(reconciliation.residual >= Decimal::ZERO);
    }

    #[test]
    fn test_large_targets_converge_with_default_settings() {
        let params = chile_parameters();

        for millions in (30..=90).step_by(5) {
            let target = Decimal::from(millions * 1_000_000);
            let request = ComputationRequest::net_to_gross(target);

            let inversion = invert(target, &request, &params).unwrap();
            assert!(inversion.converged, "target {} did not converge", target);

            let reconciliation = finalize(&inversion, target, &request, &params).unwrap();
            assert!(
                reconciliation.residual >= Decimal::ZERO,
                "target {} left residual {}",
                target,
                reconciliation.residual
            );
        }
    }

    #[test]
    fn test_huge_target_does_not_overflow() {
        let params = chile_parameters();
        let target = Decimal::from_scientific("5e28").unwrap();

        let inversion = invert(target, &ComputationRequest::net_to_gross(target), &params).unwrap();

        assert!(inversion.ceiling_reached);
        assert!(!inversion.converged);
        assert!(inversion.gross_exact <= MAX_AMOUNT);
    }

    #[test]
    fn test_iteration_cap_returns_approximate_result() {
        let mut params = chile_parameters();
        params.search.max_iterations = 3;
        let target = dec("600000");

        let inversion = invert(target, &ComputationRequest::net_to_gross(target), &params).unwrap();

        assert_eq!(inversion.iterations, 3);
        assert!(!inversion.converged);
    }

    #[test]
    fn test_non_positive_target_is_rejected() {
        let params = chile_parameters();

        for target in [Decimal::ZERO, dec("-100")] {
            let result = invert(target, &ComputationRequest::net_to_gross(target), &params);
            assert!(matches!(result, Err(EngineError::InvalidRequest { .. })));
        }
    }
}
