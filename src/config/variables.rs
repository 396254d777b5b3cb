use std::collections::HashMap;

pub const ENV_PREFIX: &str = "ETL_VAR_";

/// Key/value variables read by the DAG at definition time.
///
/// Lookup order is the environment (`ETL_VAR_<KEY>`), then the variables
/// loaded from the config file.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    file_variables: HashMap<String, String>,
}

impl VariableStore {
    pub fn with_file_variables(file_variables: HashMap<String, String>) -> Self {
        Self { file_variables }
    }

    pub fn env_key(key: &str) -> String {
        format!("{}{}", ENV_PREFIX, key.to_uppercase())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if let Ok(value) = std::env::var(Self::env_key(key)) {
            tracing::debug!("Variable {} resolved from environment", key);
            return Some(value);
        }
        self.file_variables.get(key).cloned()
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}
