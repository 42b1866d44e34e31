//! Computation request model.
//!
//! A [`ComputationRequest`] carries everything about a worker's pay that is
//! not a country parameter: the direction of the calculation, the known
//! amount, extra bonuses, the transport allowance and the worker's health and
//! pension choices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Largest monetary amount or unit count the engine accepts (10^20).
///
/// Every product and sum in a calculation stays far inside the range of
/// [`Decimal`] below this bound.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x6310_0000, 0x6BC7_5E2D, 0x5, false, 0);

/// Which amount the caller knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The gross pay is known; compute net pay.
    GrossToNet,
    /// The net pay is known; find the gross pay that produces it.
    NetToGross,
}

/// An additional bonus paid on top of the contractual gross pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonus {
    /// Free-text label shown in breakdowns.
    pub label: String,
    /// The monthly amount, never negative.
    pub amount: Decimal,
    /// Whether the bonus joins the taxable gross.
    pub taxable: bool,
}

impl Bonus {
    /// Creates a taxable bonus.
    pub fn taxable(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
            taxable: true,
        }
    }

    /// Creates a non-taxable bonus.
    pub fn non_taxable(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            amount,
            taxable: false,
        }
    }
}

/// The worker's health insurance choice.
///
/// # Example
///
/// ```
/// use payroll_engine::models::HealthPlan;
/// use rust_decimal::Decimal;
///
/// let plan: HealthPlan =
///     serde_json::from_str(r#"{"type": "private", "plan_cost_units": "2.822"}"#).unwrap();
/// assert_eq!(plan, HealthPlan::Private { plan_cost_units: Decimal::new(2822, 3) });
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HealthPlan {
    /// Public health system: the statutory floor rate only.
    #[default]
    Public,
    /// Private plan with a monthly cost in indexed units.
    Private {
        /// Plan cost in indexed units (e.g., UF).
        plan_cost_units: Decimal,
    },
}

/// A request for a single payroll calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationRequest {
    /// Whether `target_amount` is a gross or a net amount.
    pub direction: Direction,
    /// The known amount: gross for [`Direction::GrossToNet`], net otherwise.
    pub target_amount: Decimal,
    /// Additional bonuses.
    #[serde(default)]
    pub bonuses: Vec<Bonus>,
    /// Non-taxable transport allowance.
    #[serde(default)]
    pub transport_allowance: Decimal,
    /// Health insurance choice.
    #[serde(default)]
    pub health_plan: HealthPlan,
    /// Pension administrator; `None` selects the scheme default.
    #[serde(default)]
    pub pension_administrator: Option<String>,
}

impl ComputationRequest {
    /// Creates a gross-to-net request with no extras.
    pub fn gross_to_net(gross_pay: Decimal) -> Self {
        Self::new(Direction::GrossToNet, gross_pay)
    }

    /// Creates a net-to-gross request with no extras.
    pub fn net_to_gross(target_net: Decimal) -> Self {
        Self::new(Direction::NetToGross, target_net)
    }

    fn new(direction: Direction, target_amount: Decimal) -> Self {
        Self {
            direction,
            target_amount,
            bonuses: Vec::new(),
            transport_allowance: Decimal::ZERO,
            health_plan: HealthPlan::Public,
            pension_administrator: None,
        }
    }

    /// Adds a bonus.
    pub fn with_bonus(mut self, bonus: Bonus) -> Self {
        self.bonuses.push(bonus);
        self
    }

    /// Sets the transport allowance.
    pub fn with_transport_allowance(mut self, amount: Decimal) -> Self {
        self.transport_allowance = amount;
        self
    }

    /// Sets the health plan.
    pub fn with_health_plan(mut self, plan: HealthPlan) -> Self {
        self.health_plan = plan;
        self
    }

    /// Selects a pension administrator by name.
    pub fn with_pension_administrator(mut self, name: impl Into<String>) -> Self {
        self.pension_administrator = Some(name.into());
        self
    }

    /// Validates the whole request, including the target amount.
    pub fn validate(&self) -> EngineResult<()> {
        if self.target_amount <= Decimal::ZERO {
            return Err(EngineError::invalid_request(
                "target_amount",
                format!("must be greater than zero, found {}", self.target_amount),
            ));
        }
        check_upper_bound("target_amount", self.target_amount)?;
        self.validate_components()
    }

    /// Validates every field except the target amount.
    ///
    /// The forward simulation calls this for each gross it evaluates, so it
    /// must not depend on the direction.
    pub fn validate_components(&self) -> EngineResult<()> {
        for (index, bonus) in self.bonuses.iter().enumerate() {
            if bonus.label.trim().is_empty() {
                return Err(EngineError::invalid_request(
                    format!("bonuses[{}].label", index),
                    "must not be empty",
                ));
            }
            if bonus.amount < Decimal::ZERO {
                return Err(EngineError::invalid_request(
                    format!("bonuses[{}].amount", index),
                    format!("must not be negative, found {}", bonus.amount),
                ));
            }
            check_upper_bound(&format!("bonuses[{}].amount", index), bonus.amount)?;
        }

        let bonus_total = self
            .bonuses
            .iter()
            .try_fold(Decimal::ZERO, |total, b| total.checked_add(b.amount));
        match bonus_total {
            Some(total) => check_upper_bound("bonuses", total)?,
            None => {
                return Err(EngineError::invalid_request(
                    "bonuses",
                    format!("total must not exceed {}", MAX_AMOUNT),
                ));
            }
        }

        if self.transport_allowance < Decimal::ZERO {
            return Err(EngineError::invalid_request(
                "transport_allowance",
                format!("must not be negative, found {}", self.transport_allowance),
            ));
        }
        check_upper_bound("transport_allowance", self.transport_allowance)?;

        if let HealthPlan::Private { plan_cost_units } = self.health_plan {
            if plan_cost_units < Decimal::ZERO {
                return Err(EngineError::invalid_request(
                    "health_plan.plan_cost_units",
                    format!("must not be negative, found {}", plan_cost_units),
                ));
            }
            check_upper_bound("health_plan.plan_cost_units", plan_cost_units)?;
        }

        if self
            .pension_administrator
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(EngineError::invalid_request(
                "pension_administrator",
                "must not be empty when provided",
            ));
        }

        Ok(())
    }

    /// Sum of taxable bonuses.
    pub fn taxable_bonus_sum(&self) -> Decimal {
        self.bonuses
            .iter()
            .filter(|b| b.taxable)
            .map(|b| b.amount)
            .sum()
    }

    /// Sum of non-taxable bonuses.
    pub fn non_taxable_bonus_sum(&self) -> Decimal {
        self.bonuses
            .iter()
            .filter(|b| !b.taxable)
            .map(|b| b.amount)
            .sum()
    }
}

/// Rejects amounts above [`MAX_AMOUNT`].
pub(crate) fn check_upper_bound(field: &str, amount: Decimal) -> EngineResult<()> {
    if amount > MAX_AMOUNT {
        return Err(EngineError::invalid_request(
            field,
            format!("must not exceed {}, found {}", MAX_AMOUNT, amount),
        ));
    }
    Ok(())
}
