use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use crate::api::OperationError;
use crate::xmlrpc::{DocumentFetcher, RpcRequest, RpcTransport, Value};

type Responder = dyn Fn(&RpcRequest) -> Result<Value, OperationError> + Send + Sync;

#[derive(Clone)]
pub struct StubTransport {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<RpcRequest>>>,
}

impl StubTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&RpcRequest) -> Result<Value, OperationError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<RpcRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RpcTransport for StubTransport {
    async fn call(&self, request: RpcRequest) -> Result<Value, OperationError> {
        let outcome = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        // give concurrently issued calls a chance to interleave
        tokio::task::yield_now().await;
        outcome
    }
}

pub struct StubFetcher {
    document: Option<String>,
}

impl StubFetcher {
    pub fn with_document(document: &str) -> Self {
        Self {
            document: Some(document.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { document: None }
    }
}

#[async_trait]
impl DocumentFetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, OperationError> {
        self.document
            .clone()
            .ok_or_else(|| OperationError::http_status(404, format!("{} not found", url)))
    }
}
