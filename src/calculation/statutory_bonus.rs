//! Statutory bonus (gratification) calculation.

use rust_decimal::Decimal;

use crate::config::ParameterSet;

/// Computes the monthly statutory bonus for a contractual gross pay.
///
/// The bonus is `gross_pay * percentage`, limited to the monthly cap of
/// `cap_factor * minimum_wage / 12` when the country defines a cap.
///
/// Negative gross pay yields no bonus.
pub fn calculate_statutory_bonus(gross_pay: Decimal, params: &ParameterSet) -> Decimal {
    if gross_pay <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let uncapped = gross_pay * params.statutory_bonus.percentage;
    match params.statutory_bonus_cap() {
        Some(cap) => uncapped.min(cap),
        None => uncapped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::chile_parameters;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_bonus_below_cap_is_percentage_of_gross() {
        let params = chile_parameters();

        assert_eq!(calculate_statutory_bonus(dec("700000"), &params), dec("175000"));
    }

    #[test]
    fn test_bonus_above_cap_is_capped() {
        let params = chile_parameters();

        let bonus = calculate_statutory_bonus(dec("2000000"), &params);
        assert_eq!(bonus, params.statutory_bonus_cap().unwrap());
        assert_eq!(bonus.round_dp(2), dec("213354.17"));
    }

    #[test]
    fn test_uncapped_bonus_scales_with_gross() {
        let mut params = chile_parameters();
        params.statutory_bonus.cap_factor = None;

        assert_eq!(calculate_statutory_bonus(dec("2000000"), &params), dec("500000"));
    }

    #[test]
    fn test_zero_percentage_yields_no_bonus() {
        let mut params = chile_parameters();
        params.statutory_bonus.percentage = Decimal::ZERO;

        assert_eq!(calculate_statutory_bonus(dec("700000"), &params), Decimal::ZERO);
    }

    #[test]
    fn test_zero_gross_yields_no_bonus() {
        assert_eq!(
            calculate_statutory_bonus(Decimal::ZERO, &chile_parameters()),
            Decimal::ZERO
        );
    }
}
