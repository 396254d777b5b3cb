use crate::domain::model::RunContext;
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;

/// Per-run store of task return values, keyed by task id.
#[derive(Debug, Clone, Default)]
pub struct XComStore {
    values: HashMap<String, serde_json::Value>,
}

impl XComStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task_id: &str, value: serde_json::Value) {
        tracing::debug!("XCom push from {}: {}", task_id, value);
        self.values.insert(task_id.to_string(), value);
    }

    pub fn pull(&self, task_id: &str) -> Option<&serde_json::Value> {
        self.values.get(task_id)
    }

    /// Pulls a non-empty string value; `what` names it in the error.
    pub fn pull_str(&self, task_id: &str, what: &str) -> Result<String> {
        match self.pull(task_id) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            _ => Err(EtlError::XComMissing {
                task_id: task_id.to_string(),
                what: what.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// What a task sees while it runs.
pub struct TaskContext<'a> {
    pub run: &'a RunContext,
    pub xcom: &'a XComStore,
}

impl<'a> TaskContext<'a> {
    pub fn new(run: &'a RunContext, xcom: &'a XComStore) -> Self {
        Self { run, xcom }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_pull() {
        let mut xcom = XComStore::new();
        assert!(xcom.is_empty());

        xcom.push("extract_data", serde_json::json!("raw/data_20260101_000000.json"));
        xcom.push("validate_json", serde_json::json!(true));

        assert_eq!(xcom.len(), 2);
        assert_eq!(
            xcom.pull_str("extract_data", "json_path").unwrap(),
            "raw/data_20260101_000000.json"
        );
        assert_eq!(xcom.pull("validate_json"), Some(&serde_json::json!(true)));
    }

    #[test]
    fn test_pull_str_rejects_missing_and_non_string_values() {
        let mut xcom = XComStore::new();
        xcom.push("validate_json", serde_json::json!(true));
        xcom.push("empty", serde_json::json!(""));

        let err = xcom.pull_str("extract_data", "json_path").unwrap_err();
        assert_eq!(err.to_string(), "No json_path found in XCom from extract_data");

        assert!(xcom.pull_str("validate_json", "json_path").is_err());
        assert!(xcom.pull_str("empty", "json_path").is_err());
    }
}
