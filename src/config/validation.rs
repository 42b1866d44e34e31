//! Structural validation of parameter sets.
//!
//! A parameter set is validated once when it is loaded and again before a
//! calculation runs. Malformed tables are rejected, never patched.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

use super::types::{ParameterSet, PensionSystem, TaxBracket};

/// Largest gap tolerated between one bracket's upper bound and the next lower bound.
///
/// Published tables step from `x.00` to `x.01`.
pub const MAX_BRACKET_GAP: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

impl ParameterSet {
    /// Checks every structural invariant the engine relies on.
    ///
    /// Besides shape checks this enforces the monotonicity precondition of
    /// the net-to-gross search: every rate is below 100% and the worker's
    /// combined contribution rate plus the top tax rate stays below 100%.
    pub fn validate(&self) -> EngineResult<()> {
        require_positive("minimum_wage", self.minimum_wage)?;
        require_positive("unit_value", self.unit_value)?;
        require_positive("rounding_unit", self.rounding_unit)?;

        require_fraction("health.floor_rate", self.health.floor_rate)?;
        if let Some(units) = self.health.default_private_plan_units {
            require_non_negative("health.default_private_plan_units", units)?;
        }
        require_fraction("unemployment.worker_rate", self.unemployment.worker_rate)?;
        require_fraction("unemployment.employer_rate", self.unemployment.employer_rate)?;

        if let Some(cap) = self.caps.pension_health {
            require_positive("caps.pension_health", cap)?;
        }
        if let Some(cap) = self.caps.unemployment {
            require_positive("caps.unemployment", cap)?;
        }

        require_fraction("statutory_bonus.percentage", self.statutory_bonus.percentage)?;
        if let Some(factor) = self.statutory_bonus.cap_factor {
            require_non_negative("statutory_bonus.cap_factor", factor)?;
        }

        validate_brackets("tax.brackets", &self.tax.brackets)?;
        let max_pension_rate = validate_pension(&self.pension)?;

        for (name, contribution) in &self.employer_contributions {
            require_fraction(&format!("employer_contributions.{}", name), contribution.rate)?;
        }

        require_positive("search.slack_factor", self.search.slack_factor)?;
        require_positive("search.ceiling", self.search.ceiling)?;
        require_positive("search.precision", self.search.precision)?;
        if self.search.max_iterations == 0 {
            return Err(EngineError::invalid_parameters(
                "search.max_iterations",
                "must be at least 1",
            ));
        }

        let max_tax_rate = self
            .tax
            .brackets
            .iter()
            .map(|b| b.rate)
            .max()
            .unwrap_or(Decimal::ZERO);
        let worker_rate = max_pension_rate + self.health.floor_rate + self.unemployment.worker_rate;
        if worker_rate + max_tax_rate >= Decimal::ONE {
            return Err(EngineError::invalid_parameters(
                "pension",
                format!(
                    "worker contributions ({}) plus top tax rate ({}) must stay below 1 for net pay to rise with gross pay",
                    worker_rate.normalize(),
                    max_tax_rate.normalize()
                ),
            ));
        }

        Ok(())
    }
}

/// Validates a progressive table and returns nothing on success.
///
/// Brackets must be non-empty, start at zero, ascend without overlap, leave at
/// most [`MAX_BRACKET_GAP`] between neighbours and end unbounded.
pub fn validate_brackets(field: &str, brackets: &[TaxBracket]) -> EngineResult<()> {
    let first = brackets
        .first()
        .ok_or_else(|| EngineError::invalid_parameters(field, "must not be empty"))?;

    if first.lower_bound != Decimal::ZERO {
        return Err(EngineError::invalid_parameters(
            field,
            format!("first lower bound must be 0, found {}", first.lower_bound),
        ));
    }

    for (index, bracket) in brackets.iter().enumerate() {
        let at = format!("{}[{}]", field, index);
        require_fraction(&format!("{}.rate", at), bracket.rate)?;
        require_non_negative(&format!("{}.rebate", at), bracket.rebate)?;

        match (bracket.upper_bound, brackets.get(index + 1)) {
            (Some(upper), Some(next)) => {
                if upper < bracket.lower_bound {
                    return Err(EngineError::invalid_parameters(
                        at,
                        "upper bound is below lower bound",
                    ));
                }
                if next.lower_bound < upper {
                    return Err(EngineError::invalid_parameters(
                        at,
                        format!("overlaps the next bracket starting at {}", next.lower_bound),
                    ));
                }
                if next.lower_bound - upper > MAX_BRACKET_GAP {
                    return Err(EngineError::invalid_parameters(
                        at,
                        format!(
                            "leaves a gap between {} and {}",
                            upper, next.lower_bound
                        ),
                    ));
                }
            }
            (None, Some(_)) => {
                return Err(EngineError::invalid_parameters(
                    at,
                    "only the last bracket may be unbounded",
                ));
            }
            (Some(_), None) => {
                return Err(EngineError::invalid_parameters(
                    at,
                    "last bracket must be unbounded",
                ));
            }
            (None, None) => {}
        }
    }

    Ok(())
}

/// Validates the pension system and returns its highest worker rate.
fn validate_pension(pension: &PensionSystem) -> EngineResult<Decimal> {
    match pension {
        PensionSystem::FlatRate(scheme) => {
            validate_administrators(
                &scheme.administrators,
                &scheme.default_administrator,
                None,
            )
        }
        PensionSystem::Progressive(scheme) => {
            validate_brackets("pension.brackets", &scheme.brackets)?;
            Ok(scheme
                .brackets
                .iter()
                .map(|b| b.rate)
                .max()
                .unwrap_or(Decimal::ZERO))
        }
        PensionSystem::Dual(scheme) => {
            require_fraction("pension.public_rate", scheme.public_rate)?;
            let private_max = validate_administrators(
                &scheme.administrators,
                &scheme.default_administrator,
                Some(&scheme.public_fund),
            )?;
            Ok(private_max.max(scheme.public_rate))
        }
    }
}

fn validate_administrators(
    administrators: &std::collections::BTreeMap<String, Decimal>,
    default_administrator: &str,
    public_fund: Option<&str>,
) -> EngineResult<Decimal> {
    if administrators.is_empty() {
        return Err(EngineError::invalid_parameters(
            "pension.administrators",
            "must name at least one administrator",
        ));
    }

    let default_known = administrators.contains_key(default_administrator)
        || public_fund == Some(default_administrator);
    if !default_known {
        return Err(EngineError::invalid_parameters(
            "pension.default_administrator",
            format!("'{}' is not a configured administrator", default_administrator),
        ));
    }

    let mut max_rate = Decimal::ZERO;
    for (name, rate) in administrators {
        require_fraction(&format!("pension.administrators.{}", name), *rate)?;
        max_rate = max_rate.max(*rate);
    }
    Ok(max_rate)
}

fn require_positive(field: &str, value: Decimal) -> EngineResult<()> {
    if value <= Decimal::ZERO {
        return Err(EngineError::invalid_parameters(
            field,
            format!("must be greater than zero, found {}", value),
        ));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::invalid_parameters(
            field,
            format!("must not be negative, found {}", value),
        ));
    }
    Ok(())
}

fn require_fraction(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO || value >= Decimal::ONE {
        return Err(EngineError::invalid_parameters(
            field,
            format!("must be a fraction in [0, 1), found {}", value),
        ));
    }
    Ok(())
}
