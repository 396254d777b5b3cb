use crate::utils::error::{EtlError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Optional TOML file with DAG variables and HTTP source settings.
///
/// ```toml
/// [variables]
/// futurama_api_url = "https://api.sampleapis.com/futurama/characters"
/// futurama_base_dir = "${HOME}/data_api_bad"
///
/// [source]
/// timeout_seconds = 10
/// headers = { "x-api-key" = "${API_KEY}" }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub variables: HashMap<String, String>,
    pub source: Option<SourceConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay verbatim.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.source.as_ref().and_then(|s| s.timeout_seconds)
    }

    pub fn headers(&self) -> HashMap<String, String> {
        self.source
            .as_ref()
            .and_then(|s| s.headers.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_variables_and_source() {
        let toml_content = r#"
[variables]
futurama_api_url = "https://api.example.com/characters"
futurama_base_dir = "/data/etl"

[source]
timeout_seconds = 12
headers = { "x-api-key" = "abc" }
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(
            config.variables.get("futurama_api_url").unwrap(),
            "https://api.example.com/characters"
        );
        assert_eq!(config.timeout_seconds(), Some(12));
        assert_eq!(config.headers().get("x-api-key").unwrap(), "abc");
    }

    #[test]
    fn test_empty_file_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.variables.is_empty());
        assert!(config.timeout_seconds().is_none());
        assert!(config.headers().is_empty());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ETL_API_DAG_TEST_TOML_URL", "https://test.api.com");

        let toml_content = r#"
[variables]
futurama_api_url = "${ETL_API_DAG_TEST_TOML_URL}"
futurama_base_dir = "${ETL_API_DAG_TEST_TOML_UNSET}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.variables.get("futurama_api_url").unwrap(),
            "https://test.api.com"
        );
        assert_eq!(
            config.variables.get("futurama_base_dir").unwrap(),
            "${ETL_API_DAG_TEST_TOML_UNSET}"
        );

        std::env::remove_var("ETL_API_DAG_TEST_TOML_URL");
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = TomlConfig::from_toml_str("[variables\nbroken").unwrap_err();
        assert!(matches!(err, EtlError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[variables]\nfuturama_base_dir = \"/srv/etl\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.variables.get("futurama_base_dir").unwrap(), "/srv/etl");
    }
}
