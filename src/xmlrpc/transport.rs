use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use url::Url;

use super::codec::{decode_response, encode_call};
use super::value::Value;
use crate::api::error::OperationError;
use crate::common::constants::{HTTP_TIMEOUT_SECS, USER_AGENT};

#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub endpoint: Url,
    pub method: String,
    pub params: Vec<Value>,
    pub bearer_token: Option<String>,
}

impl RpcRequest {
    pub fn new(endpoint: Url, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            endpoint,
            method: method.into(),
            params,
            bearer_token: None,
        }
    }

    pub fn with_bearer(mut self, token: Option<&str>) -> Self {
        self.bearer_token = token.map(str::to_string);
        self
    }
}

#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, request: RpcRequest) -> Result<Value, OperationError>;
}

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, OperationError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, OperationError> {
        Self::with_options(Duration::from_secs(HTTP_TIMEOUT_SECS), USER_AGENT)
    }

    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self, OperationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| OperationError::transport(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, request: RpcRequest) -> Result<Value, OperationError> {
        let body = encode_call(&request.method, &request.params);
        debug!(
            "Calling {} at {} ({} params)",
            request.method,
            request.endpoint,
            request.params.len()
        );

        let mut builder = self
            .client
            .post(request.endpoint.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(body);
        if let Some(token) = &request.bearer_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!("{} answered with status {}", request.method, status);

        if !status.is_success() {
            return Err(OperationError::http_status(
                status.as_u16(),
                format!("{} returned HTTP {}", request.endpoint, status),
            ));
        }

        let text = response.text().await?;
        decode_response(&text)
    }
}

#[async_trait]
impl DocumentFetcher for HttpTransport {
    async fn fetch(&self, url: &Url) -> Result<String, OperationError> {
        debug!("Fetching document {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OperationError::http_status(
                status.as_u16(),
                format!("{} returned HTTP {}", url, status),
            ));
        }
        Ok(response.text().await?)
    }
}
