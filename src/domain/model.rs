use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One object of the raw API payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    /// Returns `None` when the value is not a JSON object.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(obj) => Some(Record {
                data: obj.into_iter().collect(),
            }),
            _ => None,
        }
    }
}

/// Identity of a single DAG run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunContext {
    pub dag_id: String,
    pub run_id: String,
    pub execution_date: DateTime<Utc>,
}

impl RunContext {
    pub fn new(dag_id: impl Into<String>, run_id: impl Into<String>, execution_date: DateTime<Utc>) -> Self {
        Self {
            dag_id: dag_id.into(),
            run_id: run_id.into(),
            execution_date,
        }
    }

    /// Run for a logical date picked by the schedule.
    pub fn scheduled(dag_id: impl Into<String>, execution_date: DateTime<Utc>) -> Self {
        let run_id = format!("scheduled__{}", rfc3339(&execution_date));
        Self::new(dag_id, run_id, execution_date)
    }

    /// Run for a logical date supplied by the operator.
    pub fn manual(dag_id: impl Into<String>, execution_date: DateTime<Utc>) -> Self {
        let run_id = format!("manual__{}", rfc3339(&execution_date));
        Self::new(dag_id, run_id, execution_date)
    }

    /// Timestamp used in artifact file names.
    pub fn file_timestamp(&self) -> String {
        self.execution_date.format("%Y%m%d_%H%M%S").to_string()
    }
}

fn rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Success,
    Failed,
    UpstreamFailed,
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskState::Success => "success",
            TaskState::Failed => "failed",
            TaskState::UpstreamFailed => "upstream_failed",
        };
        f.write_str(s)
    }
}

/// Value returned by `pipeline_summary` and pushed to XCom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub run_id: String,
    pub execution_date: DateTime<Utc>,
    pub json_file: String,
    pub csv_file: String,
    pub records_processed: usize,
}
