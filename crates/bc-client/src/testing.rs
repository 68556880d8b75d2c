//! In-memory transport for unit tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bc_core::error::ConsoleError;
use bc_core::result::ConsoleResult;
use parking_lot::Mutex;
use serde_json::Value;

use crate::transport::{Query, Transport};

#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

/// Answers from canned responses keyed by `"METHOD path"`; anything else is a 404
#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: Mutex<HashMap<String, ConsoleResult<Value>>>,
    requests: Mutex<Vec<Recorded>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: &str, path: &str, result: ConsoleResult<Value>) {
        self.responses
            .lock()
            .insert(format!("{} {}", method, path), result);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }

    fn answer(
        &self,
        method: &'static str,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> ConsoleResult<Value> {
        self.requests.lock().push(Recorded {
            method,
            path: path.to_string(),
            query: query.to_vec(),
            body: body.cloned(),
        });
        self.responses
            .lock()
            .get(&format!("{} {}", method, path))
            .cloned()
            .unwrap_or_else(|| Err(ConsoleError::not_found("resource", path)))
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str, query: &Query) -> ConsoleResult<Value> {
        tokio::task::yield_now().await;
        self.answer("GET", path, query, None)
    }

    async fn post(&self, path: &str, query: &Query, body: Option<&Value>) -> ConsoleResult<Value> {
        self.answer("POST", path, query, body)
    }

    async fn put(&self, path: &str, body: &Value) -> ConsoleResult<Value> {
        self.answer("PUT", path, &[], Some(body))
    }

    async fn delete(&self, path: &str) -> ConsoleResult<()> {
        self.answer("DELETE", path, &[], None).map(|_| ())
    }
}
