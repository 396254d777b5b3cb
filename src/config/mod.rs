#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;
pub mod variables;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_positive_number, validate_url, Validate};
use std::collections::HashMap;
use std::path::PathBuf;
use toml_config::TomlConfig;
use variables::VariableStore;

pub const API_URL_VAR: &str = "futurama_api_url";
pub const BASE_DIR_VAR: &str = "futurama_base_dir";
pub const DEFAULT_API_URL: &str = "https://api.sampleapis.com/futurama/characters";
pub const DEFAULT_BASE_DIR: &str = "/tmp/data_api_bad";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Values given explicitly on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub base_dir: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub config_file: Option<PathBuf>,
}

/// Fully resolved settings for one DAG run.
#[derive(Debug, Clone, PartialEq)]
pub struct DagConfig {
    pub api_url: String,
    pub base_dir: String,
    pub timeout_seconds: u64,
    pub headers: HashMap<String, String>,
}

impl Default for DagConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            base_dir: DEFAULT_BASE_DIR.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            headers: HashMap::new(),
        }
    }
}

impl DagConfig {
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let file = match &overrides.config_file {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        Ok(Self::from_sources(overrides, file))
    }

    pub fn from_sources(overrides: ConfigOverrides, file: TomlConfig) -> Self {
        let headers = file.headers();
        let file_timeout = file.timeout_seconds();
        let variables = VariableStore::with_file_variables(file.variables);

        let api_url = overrides
            .api_url
            .unwrap_or_else(|| variables.get_or(API_URL_VAR, DEFAULT_API_URL));
        let base_dir = overrides
            .base_dir
            .unwrap_or_else(|| variables.get_or(BASE_DIR_VAR, DEFAULT_BASE_DIR));
        let timeout_seconds = overrides
            .timeout_seconds
            .or(file_timeout)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        Self {
            api_url,
            base_dir,
            timeout_seconds,
            headers,
        }
    }
}

impl ConfigProvider for DagConfig {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}

impl Validate for DagConfig {
    fn validate(&self) -> Result<()> {
        validate_url(API_URL_VAR, &self.api_url)?;
        validate_path(BASE_DIR_VAR, &self.base_dir)?;
        validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        Ok(())
    }
}
