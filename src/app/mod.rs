pub mod tasks;

use crate::adapters::http::ApiClient;
use crate::core::dag::Dag;
use crate::core::schedule::Schedule;
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, TimeZone, Utc};
use tasks::{
    ExtractTask, SummaryTask, TransformTask, ValidateTask, EXTRACT_TASK_ID, SUMMARY_TASK_ID,
    TRANSFORM_TASK_ID, VALIDATE_TASK_ID,
};

pub const DAG_ID: &str = "etl_api_bad_practices";
pub const DAG_DESCRIPTION: &str = "INTENTIONALLY bad DAG for training";
pub const DAG_SCHEDULE: &str = "@hourly";

pub fn dag_start_date() -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| EtlError::DagError {
            message: "Invalid DAG start date".to_string(),
        })
}

/// `extract_data >> validate_json >> transform_to_csv >> pipeline_summary`
pub fn build_dag<S, C>(config: &C, storage: S) -> Result<Dag>
where
    S: Storage + Clone + 'static,
    C: ConfigProvider + ?Sized,
{
    let mut dag = Dag::new(
        DAG_ID,
        DAG_DESCRIPTION,
        Schedule::parse(DAG_SCHEDULE)?,
        dag_start_date()?,
    )
    .with_catchup(false);

    let client = ApiClient::from_config(config)?;

    dag.add_task(Box::new(ExtractTask::new(
        storage.clone(),
        client,
        config.api_url().to_string(),
    )))?;
    dag.add_task(Box::new(ValidateTask::new(storage.clone())))?;
    dag.add_task(Box::new(TransformTask::new(storage.clone())))?;
    dag.add_task(Box::new(SummaryTask::new(storage)))?;

    dag.chain(&[
        EXTRACT_TASK_ID,
        VALIDATE_TASK_ID,
        TRANSFORM_TASK_ID,
        SUMMARY_TASK_ID,
    ])?;

    Ok(dag)
}
