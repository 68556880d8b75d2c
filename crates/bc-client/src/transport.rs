//! HTTP transport
//!
//! Resources talk to the API through [`Transport`] so tests can swap in an
//! in-memory fake. [`HttpTransport`] is the reqwest implementation.

use std::time::Duration;

use async_trait::async_trait;
use bc_core::config::ConsoleConfig;
use bc_core::error::ConsoleError;
use bc_core::result::ConsoleResult;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Query string pairs
pub type Query = [(&'static str, String)];

/// Verb-level access to the REST API; paths are relative to the base URL
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &Query) -> ConsoleResult<Value>;

    async fn post(&self, path: &str, query: &Query, body: Option<&Value>) -> ConsoleResult<Value>;

    async fn put(&self, path: &str, body: &Value) -> ConsoleResult<Value>;

    async fn delete(&self, path: &str) -> ConsoleResult<()>;
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ConsoleConfig) -> ConsoleResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = config.api.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| ConsoleError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: config.api_base()?,
            token: config.api.token.clone(),
        })
    }

    fn url(&self, path: &str) -> ConsoleResult<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ConsoleError::Internal(format!("bad resource path {}: {}", path, e)))
    }

    async fn send(&self, path: &str, request: reqwest::RequestBuilder) -> ConsoleResult<Value> {
        let mut request = request.header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ConsoleError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ConsoleError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            tracing::debug!(status = status.as_u16(), path, %message, "request failed");
            return Err(ConsoleError::from_status(
                status.as_u16(),
                "resource",
                path,
                message,
            ));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error_message: Some(message),
            error_type,
        }) => Some(match error_type {
            Some(kind) => format!("{}: {}", kind, message),
            None => message,
        }),
        _ => Some(body.trim().to_string()),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &Query) -> ConsoleResult<Value> {
        tracing::debug!(path, ?query, "GET");
        let request = self.client.get(self.url(path)?).query(query);
        self.send(path, request).await
    }

    async fn post(&self, path: &str, query: &Query, body: Option<&Value>) -> ConsoleResult<Value> {
        tracing::debug!(path, ?query, "POST");
        let mut request = self.client.post(self.url(path)?).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(path, request).await
    }

    async fn put(&self, path: &str, body: &Value) -> ConsoleResult<Value> {
        tracing::debug!(path, "PUT");
        let request = self.client.put(self.url(path)?).json(body);
        self.send(path, request).await
    }

    async fn delete(&self, path: &str) -> ConsoleResult<()> {
        tracing::debug!(path, "DELETE");
        let request = self.client.delete(self.url(path)?);
        self.send(path, request).await.map(|_| ())
    }
}
