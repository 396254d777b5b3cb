use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;

/// A 2xx response body together with its parsed JSON value.
#[derive(Debug, Clone)]
pub struct JsonResponse {
    pub body: Vec<u8>,
    pub value: serde_json::Value,
}

/// Thin wrapper around `reqwest::Client` carrying timeout and default headers.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new(timeout: Duration, headers: HeaderMap) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in config.headers() {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                EtlError::InvalidConfigValueError {
                    field: "source.headers".to_string(),
                    value: key.clone(),
                    reason: format!("Invalid header name: {}", e),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                EtlError::InvalidConfigValueError {
                    field: format!("source.headers.{}", key),
                    value: value.clone(),
                    reason: format!("Invalid header value: {}", e),
                }
            })?;
            headers.insert(name, value);
        }

        Self::new(Duration::from_secs(config.timeout_seconds()), headers)
    }

    /// GETs `url` and returns the raw body of a 2xx response.
    pub async fn get_body(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        tracing::debug!("API response status: {}", response.status());

        let response = response.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    /// GETs `url` and parses the body as JSON. The body bytes are kept as sent.
    pub async fn fetch_json(&self, url: &str) -> Result<JsonResponse> {
        let body = self.get_body(url).await?;
        let value = serde_json::from_slice(&body).map_err(|e| EtlError::ValidationError {
            message: format!("API response is not valid JSON: {}", e),
        })?;
        Ok(JsonResponse { body, value })
    }
}
