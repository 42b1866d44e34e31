//! Configuration loading and management for the payroll engine.
//!
//! This module provides functionality to load per-country parameter sets from
//! YAML files, validate their structure and hand them to calculations through
//! the [`ParameterProvider`] trait.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::{ConfigLoader, ParameterProvider};
//!
//! let loader = ConfigLoader::load("./config").unwrap();
//! let params = loader.get_parameters("chile").unwrap();
//! println!("UF value: {}", params.unit_value);
//! ```

mod loader;
mod provider;
mod types;
mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use loader::ConfigLoader;
pub use provider::{ParameterProvider, StaticProvider, normalize_country_code};
pub use types::{
    BracketConvention, ContributionBase, ContributionCaps, CountryConfig, CountryMetadata,
    DEFAULT_ROUNDING_UNIT, DualScheme, EmployerContribution, FlatRateScheme, HealthConfig,
    MONTHS_PER_YEAR, ParameterSet, PensionSystem, ProgressiveScheme, SearchSettings,
    StatutoryBonusConfig, TaxBracket, TaxPeriod, TaxSchedule, UnemploymentConfig,
};
pub use validation::{MAX_BRACKET_GAP, validate_brackets};
