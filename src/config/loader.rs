//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading per-country
//! parameter sets from YAML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::provider::{ParameterProvider, normalize_country_code};
use super::types::{CountryConfig, CountryMetadata, ParameterSet};

/// Loads and provides access to country configurations.
///
/// The `ConfigLoader` reads one subdirectory per country from a root
/// directory. Every parameter set is validated while loading, so a loader
/// that was built successfully only ever hands out well-formed sets.
///
/// # Directory Structure
///
/// ```text
/// config/
/// ├── chile/
/// │   ├── country.yaml     # Country metadata
/// │   └── parameters.yaml  # Economic constants and tax table
/// └── peru/
///     ├── country.yaml
///     └── parameters.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::{ConfigLoader, ParameterProvider};
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// let params = loader.get_parameters("chile").unwrap();
/// println!("Minimum wage: {}", params.minimum_wage);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    countries: BTreeMap<String, CountryConfig>,
}

impl ConfigLoader {
    /// Loads every country directory under `path`.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The directory does not exist or contains no country
    /// - Any file contains invalid YAML or misses a required field
    /// - Any parameter set violates its invariants (`InvalidParameters`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let root_str = path.display().to_string();

        if !path.is_dir() {
            return Err(EngineError::ConfigNotFound { path: root_str });
        }

        let entries = fs::read_dir(path).map_err(|_| EngineError::ConfigNotFound {
            path: root_str.clone(),
        })?;

        let mut countries = BTreeMap::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: root_str.clone(),
            })?;

            let country_dir = entry.path();
            if country_dir.join("country.yaml").is_file() {
                let country = Self::load_country(&country_dir)?;
                countries.insert(normalize_country_code(&country.metadata().code), country);
            }
        }

        if countries.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no country directories found)", root_str),
            });
        }

        debug!(countries = countries.len(), root = %root_str, "Loaded country configurations");
        Ok(Self { countries })
    }

    /// Loads a single country directory.
    pub fn load_country<P: AsRef<Path>>(path: P) -> EngineResult<CountryConfig> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<CountryMetadata>(&path.join("country.yaml"))?;
        let parameters = Self::load_yaml::<ParameterSet>(&path.join("parameters.yaml"))?;

        parameters.validate().map_err(|err| match err {
            EngineError::InvalidParameters { field, message } => EngineError::InvalidParameters {
                field: format!("{}.{}", metadata.code, field),
                message,
            },
            other => other,
        })?;

        Ok(CountryConfig::new(metadata, parameters))
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Gets a country configuration by its code.
    pub fn get_country(&self, code: &str) -> EngineResult<&CountryConfig> {
        self.countries
            .get(&normalize_country_code(code))
            .ok_or_else(|| EngineError::CountryNotFound {
                code: code.to_string(),
            })
    }

    /// Returns the metadata of every loaded country, ordered by code.
    pub fn countries(&self) -> impl Iterator<Item = &CountryMetadata> {
        self.countries.values().map(|c| c.metadata())
    }
}

impl ParameterProvider for ConfigLoader {
    fn get_parameters(&self, country_code: &str) -> EngineResult<ParameterSet> {
        self.get_country(country_code)
            .map(|country| country.parameters().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{BracketConvention, PensionSystem, TaxPeriod};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        let codes: Vec<&str> = loader.countries().map(|m| m.code.as_str()).collect();
        assert_eq!(codes, vec!["brasil", "chile", "peru"]);
    }

    #[test]
    fn test_chile_parameters_match_published_values() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let params = loader.get_parameters("chile").unwrap();

        assert_eq!(params.minimum_wage, dec("539000"));
        assert_eq!(params.unit_value, dec("39597.67"));
        assert_eq!(params.caps.pension_health, Some(dec("89.9")));
        assert_eq!(params.caps.unemployment, Some(dec("135.1")));
        assert_eq!(params.health.floor_rate, dec("0.07"));
        assert_eq!(params.tax.brackets.len(), 8);
        assert!(params.tax.brackets.last().unwrap().upper_bound.is_none());
        assert_eq!(params, crate::config::fixtures::chile_parameters());
    }

    #[test]
    fn test_chile_metadata_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let metadata = loader.get_country("chile").unwrap().metadata();

        assert_eq!(metadata.name, "Chile");
        assert_eq!(metadata.currency, "CLP");
        assert_eq!(metadata.unit_name, "UF");
        assert_eq!(metadata.pension_system_name, "AFP");
    }

    #[test]
    fn test_peru_uses_annual_marginal_table_and_dual_pension() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let params = loader.get_parameters("peru").unwrap();

        assert_eq!(params.tax.convention, BracketConvention::Marginal);
        assert_eq!(params.tax.period, TaxPeriod::Annual);
        assert!(params.caps.pension_health.is_none());
        assert!(matches!(params.pension, PensionSystem::Dual(_)));
    }

    #[test]
    fn test_brasil_uses_progressive_pension() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let params = loader.get_parameters("Brasil").unwrap();

        assert_eq!(params.unit_value, Decimal::ONE);
        assert!(matches!(params.pension, PensionSystem::Progressive(_)));
    }

    #[test]
    fn test_get_country_unknown_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.get_country("narnia") {
            Err(EngineError::CountryNotFound { code }) => assert_eq!(code, "narnia"),
            _ => panic!("Expected CountryNotFound error"),
        }
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("/nonexistent/path"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_load_country_missing_parameters_returns_error() {
        let dir = std::env::temp_dir().join(format!("payroll-engine-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("country.yaml"),
            "code: test\nname: Test\ncurrency: TST\ncurrency_symbol: T\nunit_name: TST\n\
             pension_system_name: P\npublic_health_name: H\nprivate_health_name: PH\n",
        )
        .unwrap();

        let result = ConfigLoader::load_country(&dir);
        fs::remove_dir_all(&dir).unwrap();

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.ends_with("parameters.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_country_with_invalid_table_names_country_in_field() {
        let dir = std::env::temp_dir().join(format!("payroll-engine-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("country.yaml"),
            "code: test\nname: Test\ncurrency: TST\ncurrency_symbol: T\nunit_name: TST\n\
             pension_system_name: P\npublic_health_name: H\nprivate_health_name: PH\n",
        )
        .unwrap();
        fs::write(
            dir.join("parameters.yaml"),
            "minimum_wage: 100\npension:\n  scheme: flat_rate\n  administrators: { A: 0.1 }\n  \
             default_administrator: A\nhealth:\n  floor_rate: 0.07\ntax:\n  brackets: []\n",
        )
        .unwrap();

        let result = ConfigLoader::load_country(&dir);
        fs::remove_dir_all(&dir).unwrap();

        match result {
            Err(EngineError::InvalidParameters { field, .. }) => {
                assert_eq!(field, "test.tax.brackets");
            }
            other => panic!("Expected InvalidParameters error, got {:?}", other),
        }
    }
}
