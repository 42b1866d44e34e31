//! Request types for the payroll engine API.
//!
//! This module defines the JSON request structure for the `/calculate` endpoint.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Bonus, ComputationRequest, Direction, HealthPlan};

/// Request body for the `/calculate` endpoint.
///
/// # Example
///
/// ```
/// use payroll_engine::api::CalculationRequest;
///
/// let request: CalculationRequest = serde_json::from_str(
///     r#"{"country": "chile", "direction": "net_to_gross", "amount": "600000"}"#,
/// )
/// .unwrap();
/// assert_eq!(request.country, "chile");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Country selector (e.g., "chile").
    pub country: String,
    /// Whether `amount` is a gross or a net amount.
    pub direction: Direction,
    /// The known amount.
    pub amount: Decimal,
    /// Additional bonuses.
    #[serde(default)]
    pub bonuses: Vec<BonusRequest>,
    /// Non-taxable transport allowance.
    #[serde(default)]
    pub transport_allowance: Decimal,
    /// Health insurance choice; public when omitted.
    #[serde(default)]
    pub health_plan: HealthPlan,
    /// Pension administrator; the country default when omitted.
    #[serde(default)]
    pub pension_administrator: Option<String>,
}

/// A bonus in a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusRequest {
    /// Free-text label.
    pub label: String,
    /// Monthly amount.
    pub amount: Decimal,
    /// Whether the bonus is taxable; taxable when omitted.
    #[serde(default = "default_taxable")]
    pub taxable: bool,
}

fn default_taxable() -> bool {
    true
}

impl From<BonusRequest> for Bonus {
    fn from(req: BonusRequest) -> Self {
        Bonus {
            label: req.label,
            amount: req.amount,
            taxable: req.taxable,
        }
    }
}

impl CalculationRequest {
    /// Splits the body into the country selector and the engine request.
    pub fn into_parts(self) -> (String, ComputationRequest) {
        let request = ComputationRequest {
            direction: self.direction,
            target_amount: self.amount,
            bonuses: self.bonuses.into_iter().map(Into::into).collect(),
            transport_allowance: self.transport_allowance,
            health_plan: self.health_plan,
            pension_administrator: self.pension_administrator,
        };
        (self.country, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_minimal_request_applies_defaults() {
        let json = r#"{"country": "chile", "direction": "gross_to_net", "amount": "700000"}"#;
        let request: CalculationRequest = serde_json::from_str(json).unwrap();

        let (country, req) = request.into_parts();
        assert_eq!(country, "chile");
        assert_eq!(req.direction, Direction::GrossToNet);
        assert_eq!(req.target_amount, dec("700000"));
        assert_eq!(req.health_plan, HealthPlan::Public);
        assert!(req.bonuses.is_empty());
    }

    #[test]
    fn test_full_request_converts_to_engine_request() {
        let json = r#"{
            "country": "chile",
            "direction": "net_to_gross",
            "amount": "600000",
            "bonuses": [
                {"label": "productivity", "amount": "50000"},
                {"label": "meals", "amount": "30000", "taxable": false}
            ],
            "transport_allowance": "40000",
            "health_plan": {"type": "private", "plan_cost_units": "2.822"},
            "pension_administrator": "Habitat"
        }"#;
        let request: CalculationRequest = serde_json::from_str(json).unwrap();

        let (_, req) = request.into_parts();
        assert_eq!(req.taxable_bonus_sum(), dec("50000"));
        assert_eq!(req.non_taxable_bonus_sum(), dec("30000"));
        assert_eq!(req.transport_allowance, dec("40000"));
        assert_eq!(
            req.health_plan,
            HealthPlan::Private {
                plan_cost_units: dec("2.822")
            }
        );
        assert_eq!(req.pension_administrator.as_deref(), Some("Habitat"));
    }

    #[test]
    fn test_missing_amount_fails_to_parse() {
        let json = r#"{"country": "chile", "direction": "gross_to_net"}"#;
        let result: Result<CalculationRequest, _> = serde_json::from_str(json);

        assert!(result.is_err());
    }
}
