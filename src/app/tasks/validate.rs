use super::{load_json, EXTRACT_TASK_ID, VALIDATE_TASK_ID};
use crate::core::context::TaskContext;
use crate::domain::ports::{Storage, Task};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;

/// Keys every record must carry. Kept sorted so error messages are stable.
pub const REQUIRED_FIELDS: [&str; 3] = ["age", "id", "name"];

/// Checks the payload is a non-empty array of objects with all required keys.
/// Returns the number of records.
pub fn validate_payload(data: &serde_json::Value) -> Result<usize> {
    let rows = match data.as_array() {
        Some(rows) if !rows.is_empty() => rows,
        _ => {
            return Err(EtlError::ValidationError {
                message: "JSON must be a non-empty list".to_string(),
            })
        }
    };

    for (i, row) in rows.iter().enumerate() {
        let Some(obj) = row.as_object() else {
            return Err(EtlError::ValidationError {
                message: format!("Row {} is not a JSON object", i),
            });
        };

        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !obj.contains_key(*field))
            .collect();
        if !missing.is_empty() {
            return Err(EtlError::ValidationError {
                message: format!("Row {} missing required fields: {}", i, missing.join(", ")),
            });
        }
    }

    Ok(rows.len())
}

pub struct ValidateTask<S: Storage> {
    storage: S,
}

impl<S: Storage> ValidateTask<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: Storage> Task for ValidateTask<S> {
    fn task_id(&self) -> &str {
        VALIDATE_TASK_ID
    }

    async fn execute(&self, ctx: &TaskContext<'_>) -> Result<Option<serde_json::Value>> {
        let json_path = ctx.xcom.pull_str(EXTRACT_TASK_ID, "json_path")?;

        let data = load_json(&self.storage, &json_path).await?;
        let count = validate_payload(&data)?;

        tracing::info!("Validation OK: {} records validated", count);

        Ok(Some(serde_json::Value::Bool(true)))
    }
}
