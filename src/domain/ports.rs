use crate::core::context::TaskContext;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Human-readable location of `path`, used in logs.
    fn location(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn api_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn headers(&self) -> &HashMap<String, String>;
}

/// A unit of work in a DAG. `Some(value)` is pushed to XCom under the task id.
#[async_trait]
pub trait Task: Send + Sync {
    fn task_id(&self) -> &str;
    async fn execute(&self, ctx: &TaskContext<'_>) -> Result<Option<serde_json::Value>>;
}
