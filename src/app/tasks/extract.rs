use super::EXTRACT_TASK_ID;
use crate::adapters::http::ApiClient;
use crate::core::context::TaskContext;
use crate::domain::ports::{Storage, Task};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;

/// Fetches the API payload and stores it under `raw/`. Returns the JSON path.
pub struct ExtractTask<S: Storage> {
    storage: S,
    client: ApiClient,
    api_url: String,
}

impl<S: Storage> ExtractTask<S> {
    pub fn new(storage: S, client: ApiClient, api_url: String) -> Self {
        Self {
            storage,
            client,
            api_url,
        }
    }
}

#[async_trait]
impl<S: Storage> Task for ExtractTask<S> {
    fn task_id(&self) -> &str {
        EXTRACT_TASK_ID
    }

    async fn execute(&self, ctx: &TaskContext<'_>) -> Result<Option<serde_json::Value>> {
        let json_path = format!("raw/data_{}.json", ctx.run.file_timestamp());

        tracing::info!("Calling API: {}", self.api_url);
        let response = self.client.fetch_json(&self.api_url).await?;

        let records = match &response.value {
            serde_json::Value::Array(items) if !items.is_empty() => items,
            _ => {
                return Err(EtlError::task(
                    EXTRACT_TASK_ID,
                    "API returned an empty or invalid list",
                ))
            }
        };

        tracing::info!("Received {} records from API", records.len());

        self.storage.write_file(&json_path, &response.body).await?;

        tracing::info!("JSON written to {}", self.storage.location(&json_path));

        Ok(Some(serde_json::Value::String(json_path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tasks::test_support::{run_context, MockStorage};
    use crate::core::context::XComStore;
    use httpmock::prelude::*;
    use reqwest::header::HeaderMap;
    use std::time::Duration;

    fn task(storage: MockStorage, url: String) -> ExtractTask<MockStorage> {
        let client = ApiClient::new(Duration::from_secs(5), HeaderMap::new()).unwrap();
        ExtractTask::new(storage, client, url)
    }

    #[tokio::test]
    async fn test_extract_writes_timestamped_raw_file() {
        let server = MockServer::start();
        let payload = serde_json::json!([
            {"id": 1, "name": {"first": "Philip", "last": "Fry"}, "age": "25"},
            {"id": 2, "name": {"first": "Turanga", "last": "Leela"}, "age": "25"}
        ]);
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/characters");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(payload.clone());
        });

        let storage = MockStorage::new();
        let run = run_context();
        let xcom = XComStore::new();
        let ctx = TaskContext::new(&run, &xcom);

        let output = task(storage.clone(), server.url("/characters"))
            .execute(&ctx)
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(output, Some(serde_json::json!("raw/data_20260301_080000.json")));

        let written = storage.get_file("raw/data_20260301_080000.json").await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&written).unwrap();
        assert_eq!(parsed, payload);
    }

    #[tokio::test]
    async fn test_extract_stores_response_body_unchanged() {
        let body = r#"[{"name":"Fry","id":123456789012345678901234,"age":"25"}]"#;
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/characters");
            then.status(200)
                .header("Content-Type", "application/json")
                .body(body);
        });

        let storage = MockStorage::new();
        let run = run_context();
        let xcom = XComStore::new();
        let ctx = TaskContext::new(&run, &xcom);

        task(storage.clone(), server.url("/characters"))
            .execute(&ctx)
            .await
            .unwrap();

        let written = storage.get_file("raw/data_20260301_080000.json").await.unwrap();
        assert_eq!(written, body.as_bytes());
    }

    #[tokio::test]
    async fn test_extract_rejects_empty_list() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/characters");
            then.status(200).json_body(serde_json::json!([]));
        });

        let storage = MockStorage::new();
        let run = run_context();
        let xcom = XComStore::new();
        let ctx = TaskContext::new(&run, &xcom);

        let err = task(storage.clone(), server.url("/characters"))
            .execute(&ctx)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("API returned an empty or invalid list"));
        assert!(storage.get_file("raw/data_20260301_080000.json").await.is_none());
    }

    #[tokio::test]
    async fn test_extract_rejects_single_object() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/characters");
            then.status(200).json_body(serde_json::json!({"id": 1}));
        });

        let run = run_context();
        let xcom = XComStore::new();
        let ctx = TaskContext::new(&run, &xcom);

        let err = task(MockStorage::new(), server.url("/characters"))
            .execute(&ctx)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("empty or invalid list"));
    }

    #[tokio::test]
    async fn test_extract_propagates_http_errors() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/characters");
            then.status(500);
        });

        let run = run_context();
        let xcom = XComStore::new();
        let ctx = TaskContext::new(&run, &xcom);

        let err = task(MockStorage::new(), server.url("/characters"))
            .execute(&ctx)
            .await
            .unwrap_err();

        api_mock.assert();
        assert!(matches!(err, EtlError::ApiError(_)));
    }
}
