//! Pension contribution schemes.
//!
//! Countries differ in how the worker's pension contribution is levied. Each
//! shape implements [`PensionScheme`]; the country's parameter file selects
//! which one applies through [`PensionSystem`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::warn;

use crate::config::{DualScheme, FlatRateScheme, PensionSystem, ProgressiveScheme};
use crate::models::PensionContribution;

use super::tax::compute_marginal_tax;

/// A pension contribution rule.
pub trait PensionScheme {
    /// Computes the worker's contribution on the capped pension base.
    ///
    /// `administrator` selects the administrator or fund. `None` selects the
    /// scheme default. An unknown name also uses the default and sets
    /// [`PensionContribution::fallback_applied`].
    fn compute_pension_contribution(
        &self,
        base: Decimal,
        administrator: Option<&str>,
    ) -> PensionContribution;

    /// Names a worker may choose from, sorted.
    fn administrators(&self) -> Vec<String>;

    /// The administrator used when none is requested.
    fn default_administrator(&self) -> &str;
}

impl PensionSystem {
    /// Returns the contribution rule for this system.
    pub fn as_scheme(&self) -> &dyn PensionScheme {
        match self {
            PensionSystem::FlatRate(scheme) => scheme,
            PensionSystem::Progressive(scheme) => scheme,
            PensionSystem::Dual(scheme) => scheme,
        }
    }
}

/// Looks up an administrator, preferring an exact match over a case-insensitive one.
fn find_rate<'a>(
    administrators: &'a BTreeMap<String, Decimal>,
    name: &str,
) -> Option<(&'a str, Decimal)> {
    administrators
        .get_key_value(name)
        .or_else(|| {
            administrators
                .iter()
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        })
        .map(|(name, rate)| (name.as_str(), *rate))
}

fn warn_fallback(requested: &str, applied: &str) {
    warn!(
        requested = %requested,
        applied = %applied,
        "Unknown pension administrator, falling back to default"
    );
}

fn flat_contribution(
    base: Decimal,
    administrator: &str,
    rate: Decimal,
    fallback_applied: bool,
) -> PensionContribution {
    PensionContribution {
        amount: base.max(Decimal::ZERO) * rate,
        administrator: administrator.to_string(),
        rate,
        fallback_applied,
    }
}

impl PensionScheme for FlatRateScheme {
    fn compute_pension_contribution(
        &self,
        base: Decimal,
        administrator: Option<&str>,
    ) -> PensionContribution {
        let default_rate = self
            .administrators
            .get(&self.default_administrator)
            .copied()
            .unwrap_or(Decimal::ZERO);

        match administrator {
            None => flat_contribution(base, &self.default_administrator, default_rate, false),
            Some(requested) => match find_rate(&self.administrators, requested) {
                Some((name, rate)) => flat_contribution(base, name, rate, false),
                None => {
                    warn_fallback(requested, &self.default_administrator);
                    flat_contribution(base, &self.default_administrator, default_rate, true)
                }
            },
        }
    }

    fn administrators(&self) -> Vec<String> {
        self.administrators.keys().cloned().collect()
    }

    fn default_administrator(&self) -> &str {
        &self.default_administrator
    }
}

impl PensionScheme for ProgressiveScheme {
    fn compute_pension_contribution(
        &self,
        base: Decimal,
        administrator: Option<&str>,
    ) -> PensionContribution {
        let fallback_applied =
            administrator.is_some_and(|name| !name.eq_ignore_ascii_case(&self.fund_name));
        if fallback_applied {
            warn_fallback(administrator.unwrap_or_default(), &self.fund_name);
        }

        let amount = compute_marginal_tax(base, &self.brackets);
        let rate = if base > Decimal::ZERO {
            amount / base
        } else {
            Decimal::ZERO
        };

        PensionContribution {
            amount,
            administrator: self.fund_name.clone(),
            rate,
            fallback_applied,
        }
    }

    fn administrators(&self) -> Vec<String> {
        vec![self.fund_name.clone()]
    }

    fn default_administrator(&self) -> &str {
        &self.fund_name
    }
}

impl DualScheme {
    fn rate_for(&self, name: &str) -> Option<(&str, Decimal)> {
        if name.eq_ignore_ascii_case(&self.public_fund) {
            Some((self.public_fund.as_str(), self.public_rate))
        } else {
            find_rate(&self.administrators, name)
        }
    }
}

impl PensionScheme for DualScheme {
    fn compute_pension_contribution(
        &self,
        base: Decimal,
        administrator: Option<&str>,
    ) -> PensionContribution {
        let default_rate = self
            .rate_for(&self.default_administrator)
            .map(|(_, rate)| rate)
            .unwrap_or(Decimal::ZERO);

        match administrator {
            None => flat_contribution(base, &self.default_administrator, default_rate, false),
            Some(requested) => match self.rate_for(requested) {
                Some((name, rate)) => flat_contribution(base, name, rate, false),
                None => {
                    warn_fallback(requested, &self.default_administrator);
                    flat_contribution(base, &self.default_administrator, default_rate, true)
                }
            },
        }
    }

    fn administrators(&self) -> Vec<String> {
        let mut names: Vec<String> = self.administrators.keys().cloned().collect();
        names.push(self.public_fund.clone());
        names.sort();
        names
    }

    fn default_administrator(&self) -> &str {
        &self.default_administrator
    }
}
