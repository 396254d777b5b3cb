mod extract;
mod summary;
mod transform;
mod validate;

pub use extract::ExtractTask;
pub use summary::{count_csv_rows, SummaryTask};
pub use transform::{cell_value, records_to_csv, TransformTask};
pub use validate::{validate_payload, ValidateTask, REQUIRED_FIELDS};

use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};

pub const EXTRACT_TASK_ID: &str = "extract_data";
pub const VALIDATE_TASK_ID: &str = "validate_json";
pub const TRANSFORM_TASK_ID: &str = "transform_to_csv";
pub const SUMMARY_TASK_ID: &str = "pipeline_summary";

/// Reads a JSON artifact written by `extract_data`.
async fn load_json<S: Storage>(storage: &S, path: &str) -> Result<serde_json::Value> {
    let bytes = match storage.read_file(path).await {
        Ok(bytes) => bytes,
        Err(EtlError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(EtlError::ValidationError {
                message: format!("JSON file not found: {}", storage.location(path)),
            });
        }
        Err(e) => return Err(e),
    };

    serde_json::from_slice(&bytes).map_err(|e| EtlError::ValidationError {
        message: format!("Invalid JSON in {}: {}", storage.location(path), e),
    })
}
