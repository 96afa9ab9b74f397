//! Error types for the library layer.

use std::fmt;

use crate::config::ConfigError;
use crate::registry::RegistryError;

/// Errors produced by the library layer, wrapping upstream client errors
/// and adding registry, configuration, serialization and validation failures.
#[derive(Debug)]
pub enum LoanAnalysisError {
    /// An error from the call report client.
    Api(callreport_api::Error),
    /// The bank reference table could not be loaded.
    Registry(RegistryError),
    /// Configuration could not be resolved.
    Config(ConfigError),
    /// JSON serialization or deserialization failed.
    Serialization(serde_json::Error),
    /// Reading or writing CSV data failed.
    Csv(csv::Error),
    /// Reading or writing a file failed.
    Io(std::io::Error),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for LoanAnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Registry(e) => write!(f, "Bank registry error: {}", e),
            Self::Config(e) => write!(f, "Configuration error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::Csv(e) => write!(f, "CSV error: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for LoanAnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Registry(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Serialization(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<callreport_api::Error> for LoanAnalysisError {
    fn from(e: callreport_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<RegistryError> for LoanAnalysisError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<ConfigError> for LoanAnalysisError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<serde_json::Error> for LoanAnalysisError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}

impl From<std::io::Error> for LoanAnalysisError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for LoanAnalysisError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}
