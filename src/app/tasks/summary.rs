use super::{EXTRACT_TASK_ID, SUMMARY_TASK_ID, TRANSFORM_TASK_ID};
use crate::core::context::TaskContext;
use crate::domain::model::PipelineSummary;
use crate::domain::ports::{Storage, Task};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::SecondsFormat;

/// Number of data rows in a CSV file with a header line.
pub fn count_csv_rows(bytes: &[u8]) -> Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let mut count = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(count)
}

pub struct SummaryTask<S: Storage> {
    storage: S,
}

impl<S: Storage> SummaryTask<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: Storage> Task for SummaryTask<S> {
    fn task_id(&self) -> &str {
        SUMMARY_TASK_ID
    }

    async fn execute(&self, ctx: &TaskContext<'_>) -> Result<Option<serde_json::Value>> {
        let json_path = ctx.xcom.pull_str(EXTRACT_TASK_ID, "json_path")?;
        let csv_path = ctx.xcom.pull_str(TRANSFORM_TASK_ID, "csv_path")?;

        let csv_bytes = self.storage.read_file(&csv_path).await?;
        let record_count = count_csv_rows(&csv_bytes)?;

        let summary = PipelineSummary {
            run_id: ctx.run.run_id.clone(),
            execution_date: ctx.run.execution_date,
            json_file: self.storage.location(&json_path),
            csv_file: self.storage.location(&csv_path),
            records_processed: record_count,
        };

        tracing::info!("========== SUMMARY ==========");
        tracing::info!("DAG Run ID: {}", summary.run_id);
        tracing::info!(
            "Execution date: {}",
            summary.execution_date.to_rfc3339_opts(SecondsFormat::Secs, false)
        );
        tracing::info!("JSON file: {}", summary.json_file);
        tracing::info!("CSV file: {}", summary.csv_file);
        tracing::info!("Records processed: {}", summary.records_processed);

        Ok(Some(serde_json::to_value(&summary)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tasks::test_support::{run_context, xcom_with, MockStorage};
    use serde_json::json;

    #[test]
    fn test_count_csv_rows() {
        assert_eq!(count_csv_rows(b"id,name\r\n").unwrap(), 0);
        assert_eq!(count_csv_rows(b"id,name\r\n1,Fry\r\n2,Leela\r\n").unwrap(), 2);
    }

    #[test]
    fn test_multiline_cells_count_once() {
        let csv = b"id,quote\r\n1,\"Good news,\r\neveryone!\"\r\n2,Bite my shiny metal\r\n";
        assert_eq!(count_csv_rows(csv).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_summary_pulls_both_paths() {
        let storage = MockStorage::new();
        storage
            .put_file("processed/data.csv", b"age,id,name\r\n25,1,Fry\r\n4,2,Bender\r\n")
            .await;

        let run = run_context();
        let xcom = xcom_with(&[
            (EXTRACT_TASK_ID, json!("raw/data.json")),
            (TRANSFORM_TASK_ID, json!("processed/data.csv")),
        ]);
        let ctx = TaskContext::new(&run, &xcom);

        let output = SummaryTask::new(storage).execute(&ctx).await.unwrap().unwrap();
        let summary: PipelineSummary = serde_json::from_value(output).unwrap();

        assert_eq!(summary.run_id, "scheduled__2026-03-01T08:00:00+00:00");
        assert_eq!(summary.json_file, "mem://raw/data.json");
        assert_eq!(summary.csv_file, "mem://processed/data.csv");
        assert_eq!(summary.records_processed, 2);
    }

    #[tokio::test]
    async fn test_summary_without_csv_path_fails() {
        let run = run_context();
        let xcom = xcom_with(&[(EXTRACT_TASK_ID, json!("raw/data.json"))]);
        let ctx = TaskContext::new(&run, &xcom);

        let err = SummaryTask::new(MockStorage::new())
            .execute(&ctx)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No csv_path found in XCom from transform_to_csv");
    }
}
