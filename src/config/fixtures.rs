//! Parameter sets shared by unit tests.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

use super::types::{
    ContributionBase, ContributionCaps, DEFAULT_ROUNDING_UNIT, EmployerContribution,
    FlatRateScheme, HealthConfig, ParameterSet, PensionSystem, SearchSettings,
    StatutoryBonusConfig, TaxBracket, TaxSchedule, UnemploymentConfig,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Builds rebate-free brackets from `(lower, upper, rate)` triples.
pub fn flat_table(rows: &[(&str, Option<&str>, &str)]) -> Vec<TaxBracket> {
    rows.iter()
        .map(|(lower, upper, rate)| TaxBracket {
            lower_bound: dec(lower),
            upper_bound: upper.map(dec),
            rate: dec(rate),
            rebate: Decimal::ZERO,
        })
        .collect()
}

/// The Chilean single-tax table (rebate convention).
pub fn chile_brackets() -> Vec<TaxBracket> {
    [
        ("0", Some("938817.00"), "0.00", "0"),
        ("938817.01", Some("2086260.00"), "0.04", "37552.68"),
        ("2086260.01", Some("3477100.00"), "0.08", "121003.08"),
        ("3477100.01", Some("4867940.00"), "0.135", "312243.58"),
        ("4867940.01", Some("6258780.00"), "0.23", "774697.88"),
        ("6258780.01", Some("8345040.00"), "0.304", "1237847.60"),
        ("8345040.01", Some("21558020.00"), "0.35", "1621719.44"),
        ("21558020.01", None, "0.40", "2699620.44"),
    ]
    .iter()
    .map(|(lower, upper, rate, rebate)| TaxBracket {
        lower_bound: dec(lower),
        upper_bound: upper.map(dec),
        rate: dec(rate),
        rebate: dec(rebate),
    })
    .collect()
}

/// A complete Chilean parameter set.
pub fn chile_parameters() -> ParameterSet {
    let administrators: BTreeMap<String, Decimal> = [
        ("Capital", "0.1144"),
        ("Cuprum", "0.1144"),
        ("Habitat", "0.1127"),
        ("Modelo", "0.1066"),
        ("PlanVital", "0.1116"),
        ("Provida", "0.1145"),
        ("Uno", "0.1049"),
    ]
    .iter()
    .map(|(name, rate)| (name.to_string(), dec(rate)))
    .collect();

    let employer_contributions: BTreeMap<String, EmployerContribution> = [
        ("mutual", "0.0093", ContributionBase::PensionHealth),
        ("sis", "0.0154", ContributionBase::PensionHealth),
        ("afp_employer", "0.001", ContributionBase::PensionHealth),
    ]
    .iter()
    .map(|(name, rate, base)| {
        (
            name.to_string(),
            EmployerContribution {
                rate: dec(rate),
                base: *base,
            },
        )
    })
    .collect();

    ParameterSet {
        minimum_wage: dec("539000"),
        unit_value: dec("39597.67"),
        pension: PensionSystem::FlatRate(FlatRateScheme {
            administrators,
            default_administrator: "Uno".to_string(),
        }),
        health: HealthConfig {
            floor_rate: dec("0.07"),
            default_private_plan_units: Some(dec("2.822")),
        },
        unemployment: UnemploymentConfig {
            worker_rate: dec("0.006"),
            employer_rate: dec("0.024"),
        },
        caps: ContributionCaps {
            pension_health: Some(dec("89.9")),
            unemployment: Some(dec("135.1")),
        },
        statutory_bonus: StatutoryBonusConfig {
            percentage: dec("0.25"),
            cap_factor: Some(dec("4.75")),
        },
        tax: TaxSchedule {
            convention: Default::default(),
            period: Default::default(),
            brackets: chile_brackets(),
        },
        employer_contributions,
        search: SearchSettings::default(),
        rounding_unit: DEFAULT_ROUNDING_UNIT,
    }
}
