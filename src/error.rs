//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading parameter sets or
//! running a gross/net calculation.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// Validation errors (`InvalidRequest`, `CountryNotFound`) are correctable by
/// the caller. Configuration errors (`ConfigNotFound`, `ConfigParseError`,
/// `InvalidParameters`) point at the parameter source. Convergence shortfalls
/// and fallback substitutions are never errors; they are reported on the
/// calculation result instead.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::CountryNotFound {
///     code: "narnia".to_string(),
/// };
/// assert_eq!(error.to_string(), "Country not supported: narnia");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A parameter set violates one of its structural invariants.
    #[error("Invalid parameter '{field}': {message}")]
    InvalidParameters {
        /// The parameter that was invalid.
        field: String,
        /// The constraint that was violated.
        message: String,
    },

    /// No parameter set is available for the requested country.
    #[error("Country not supported: {code}")]
    CountryNotFound {
        /// The country code that was requested.
        code: String,
    },

    /// A computation request was invalid.
    #[error("Invalid request field '{field}': {message}")]
    InvalidRequest {
        /// The request field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidRequest`].
    pub fn invalid_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`EngineError::InvalidParameters`].
    pub fn invalid_parameters(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidParameters {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors the caller can fix by changing the request.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidRequest { .. } | EngineError::CountryNotFound { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
