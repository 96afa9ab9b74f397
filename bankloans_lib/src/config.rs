//! Runtime configuration: defaults, then an optional TOML file, then
//! environment variables.
//!
//! Credentials never have defaults. They are only required by commands that
//! fetch data, so [`AppConfig::credentials`] is checked lazily.

use std::path::{Path, PathBuf};

use callreport_api::Credentials;
use serde::Deserialize;
use thiserror::Error;

pub const ENV_BANKS_CSV: &str = "BANKLOANS_BANKS_CSV";
pub const ENV_BASE_URL: &str = "BANKLOANS_API_BASE_URL";
pub const ENV_API_USER: &str = "BANKLOANS_API_USER";
pub const ENV_API_TOKEN: &str = "BANKLOANS_API_TOKEN";
pub const ENV_REPORTING_PERIOD: &str = "BANKLOANS_REPORTING_PERIOD";

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "bankloans.toml";
pub const DEFAULT_BANKS_CSV: &str = "banks.csv";
pub const DEFAULT_REPORTING_PERIOD: &str = "6/30/2024";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Missing API credentials: set BANKLOANS_API_USER and BANKLOANS_API_TOKEN (or username/token in the config file)")]
    MissingCredentials,
}

/// Shape of the optional TOML file. Every key is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub banks_csv: Option<PathBuf>,
    pub api_base_url: Option<String>,
    pub username: Option<String>,
    pub token: Option<String>,
    pub reporting_period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub banks_csv: PathBuf,
    pub api_base_url: String,
    pub username: Option<String>,
    pub token: Option<String>,
    pub reporting_period: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            banks_csv: PathBuf::from(DEFAULT_BANKS_CSV),
            api_base_url: callreport_api::DEFAULT_BASE_URL.to_string(),
            username: None,
            token: None,
            reporting_period: DEFAULT_REPORTING_PERIOD.to_string(),
        }
    }
}

impl AppConfig {
    /// Resolves the full configuration.
    ///
    /// An explicit `path` must exist. Without one, `bankloans.toml` in the
    /// working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let file_path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        };
        if let Some(p) = file_path {
            let text = std::fs::read_to_string(&p).map_err(|source| ConfigError::Read {
                path: p.display().to_string(),
                source,
            })?;
            config.merge_file(Self::parse_file(&text)?);
            tracing::debug!("Loaded config file {}", p.display());
        }
        config.merge_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse_file(toml_content: &str) -> Result<ConfigFile, ConfigError> {
        Ok(toml::from_str(toml_content)?)
    }

    pub fn merge_file(&mut self, file: ConfigFile) {
        if let Some(v) = file.banks_csv {
            self.banks_csv = v;
        }
        if let Some(v) = file.api_base_url {
            self.api_base_url = v;
        }
        if file.username.is_some() {
            self.username = file.username;
        }
        if file.token.is_some() {
            self.token = file.token;
        }
        if let Some(v) = file.reporting_period {
            self.reporting_period = v;
        }
    }

    /// Applies overrides from `lookup`; empty values are ignored.
    pub fn merge_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(ENV_BANKS_CSV) {
            self.banks_csv = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_BASE_URL) {
            self.api_base_url = v;
        }
        if let Some(v) = get(ENV_API_USER) {
            self.username = Some(v);
        }
        if let Some(v) = get(ENV_API_TOKEN) {
            self.token = Some(v);
        }
        if let Some(v) = get(ENV_REPORTING_PERIOD) {
            self.reporting_period = v;
        }
    }

    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        match (&self.username, &self.token) {
            (Some(user), Some(token)) => Ok(Credentials::new(user.clone(), token.clone())),
            _ => Err(ConfigError::MissingCredentials),
        }
    }
}
