use super::{load_json, EXTRACT_TASK_ID, TRANSFORM_TASK_ID};
use crate::core::context::TaskContext;
use crate::domain::model::Record;
use crate::domain::ports::{Storage, Task};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::Path;

/// Renders one JSON value as a CSV cell.
pub fn cell_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(true) => "True".to_string(),
        serde_json::Value::Bool(false) => "False".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

/// Writes records as CSV with the sorted union of their keys as header.
/// Returns the header and the encoded file.
pub fn records_to_csv(records: &[Record]) -> Result<(Vec<String>, Vec<u8>)> {
    let fieldnames: Vec<String> = records
        .iter()
        .flat_map(|r| r.data.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(&fieldnames)?;
    for record in records {
        let row = fieldnames
            .iter()
            .map(|field| record.data.get(field).map(cell_value).unwrap_or_default());
        writer.write_record(row)?;
    }

    let bytes = writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))?;
    Ok((fieldnames, bytes))
}

/// Flattens the raw JSON into `processed/<stem>.csv`. Returns the CSV path.
pub struct TransformTask<S: Storage> {
    storage: S,
}

impl<S: Storage> TransformTask<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: Storage> Task for TransformTask<S> {
    fn task_id(&self) -> &str {
        TRANSFORM_TASK_ID
    }

    async fn execute(&self, ctx: &TaskContext<'_>) -> Result<Option<serde_json::Value>> {
        let json_path = ctx.xcom.pull_str(EXTRACT_TASK_ID, "json_path")?;

        let base_name = Path::new(&json_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| EtlError::task(TRANSFORM_TASK_ID, format!("Bad JSON path: {}", json_path)))?;
        let csv_path = format!("processed/{}.csv", base_name);

        let data = load_json(&self.storage, &json_path).await?;
        let rows = match data {
            serde_json::Value::Array(rows) if !rows.is_empty() => rows,
            _ => {
                return Err(EtlError::ValidationError {
                    message: "JSON must be a non-empty list".to_string(),
                })
            }
        };

        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                Record::from_value(row).ok_or_else(|| EtlError::ValidationError {
                    message: format!("Row {} is not a JSON object", i),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let (fieldnames, bytes) = records_to_csv(&records)?;
        tracing::info!("Dynamic schema detected ({} columns)", fieldnames.len());
        tracing::debug!("Columns: {}", fieldnames.join(", "));

        self.storage.write_file(&csv_path, &bytes).await?;
        tracing::info!("CSV written to {}", self.storage.location(&csv_path));

        Ok(Some(serde_json::Value::String(csv_path)))
    }
}
