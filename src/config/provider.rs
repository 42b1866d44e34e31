//! Parameter providers.
//!
//! The engine only needs a way to obtain an immutable [`ParameterSet`] for a
//! country code. Where the parameters come from (YAML files, an in-memory
//! table, a remote feed) is the provider's concern.

use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};

use super::types::ParameterSet;

/// Supplies parameter sets by country code.
///
/// Implementations must return a structurally valid set and hand every
/// caller its own copy, so in-flight calculations never observe a refresh.
pub trait ParameterProvider: Send + Sync {
    /// Returns the parameter set for `country_code`.
    ///
    /// Fails with [`EngineError::CountryNotFound`] for unknown codes.
    fn get_parameters(&self, country_code: &str) -> EngineResult<ParameterSet>;
}

/// Normalizes a country selector for lookups ("  Chile " -> "chile").
pub fn normalize_country_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// An in-memory provider over a fixed table of parameter sets.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::{ConfigLoader, ParameterProvider, StaticProvider};
///
/// let loader = ConfigLoader::load("./config")?;
/// let chile = loader.get_parameters("chile")?;
/// let provider = StaticProvider::new().with_country("chile", chile)?;
/// assert!(provider.get_parameters("CHILE").is_ok());
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    parameters: BTreeMap<String, ParameterSet>,
}

impl StaticProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a country after validating its parameter set.
    pub fn with_country(mut self, code: &str, parameters: ParameterSet) -> EngineResult<Self> {
        parameters.validate()?;
        self.parameters
            .insert(normalize_country_code(code), parameters);
        Ok(self)
    }
}

impl ParameterProvider for StaticProvider {
    fn get_parameters(&self, country_code: &str) -> EngineResult<ParameterSet> {
        self.parameters
            .get(&normalize_country_code(country_code))
            .cloned()
            .ok_or_else(|| EngineError::CountryNotFound {
                code: country_code.to_string(),
            })
    }
}
