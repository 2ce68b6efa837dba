use std::sync::Arc;

use log::{debug, info};
use url::Url;

use super::error::{DiscoveryError, OperationError};
use super::posts::{
    media_item, post_summaries, publish_result, MediaUpload, Post, PostSummary, PublishResult,
};
use crate::auth::{classify_check, Credential};
use crate::common::constants::DEFAULT_BLOG_ID;
use crate::composer::{compose, MediaItem};
use crate::discovery::{Discovery, EndpointResolver};
use crate::xmlrpc::{structure, DocumentFetcher, RpcRequest, RpcTransport, Value};

#[derive(Clone)]
pub struct ApiClient {
    endpoint: Url,
    credential: Credential,
    transport: Arc<dyn RpcTransport>,
}

impl ApiClient {
    pub fn new(endpoint: Url, credential: Credential, transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            endpoint,
            credential,
            transport,
        }
    }

    pub fn with_password(
        endpoint: Url,
        username: impl Into<String>,
        password: impl Into<String>,
        transport: Arc<dyn RpcTransport>,
    ) -> Self {
        Self::new(endpoint, Credential::password(username, password), transport)
    }

    pub fn with_token(
        endpoint: Url,
        token: impl Into<String>,
        transport: Arc<dyn RpcTransport>,
    ) -> Self {
        Self::new(endpoint, Credential::token(token), transport)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub async fn resolve_endpoint(
        site: &str,
        transport: Arc<dyn RpcTransport>,
        fetcher: Arc<dyn DocumentFetcher>,
    ) -> Result<Discovery, DiscoveryError> {
        EndpointResolver::new(transport, fetcher).resolve(site).await
    }

    pub async fn check_credentials(&self) -> Result<bool, OperationError> {
        let [username, password] = self.credential.rpc_params();
        let outcome = self.call("wp.getUsersBlogs", vec![username, password]).await;
        classify_check(outcome)
    }

    pub async fn publish(&self, post: &Post) -> Result<PublishResult, OperationError> {
        let content = compose(post.attachment.as_ref(), post.content.as_deref());

        let mut fields = vec![
            ("post_type", Value::from("post")),
            ("post_status", Value::from("publish")),
        ];
        if let Some(title) = &post.title {
            fields.push(("post_title", Value::from(title.as_str())));
        }
        if !content.is_empty() {
            fields.push(("post_content", Value::from(content)));
        }

        let value = self
            .call("wp.newPost", self.blog_params(structure(fields)))
            .await?;
        let result = publish_result(&value, &self.endpoint)?;
        info!("Published post {} at {}", result.id, result.address);
        Ok(result)
    }

    pub async fn recent_posts(&self, count: u32) -> Result<Vec<PostSummary>, OperationError> {
        // WordPress reads zero as "use the default count"
        if count == 0 {
            return Ok(Vec::new());
        }
        let filter = structure([
            ("post_type", Value::from("post")),
            ("number", Value::Int(i64::from(count))),
        ]);
        let value = self.call("wp.getPosts", self.blog_params(filter)).await?;
        let posts = post_summaries(&value)?;
        debug!("Fetched {} recent posts", posts.len());
        Ok(posts)
    }

    pub async fn upload_media(&self, upload: &MediaUpload) -> Result<MediaItem, OperationError> {
        let data = structure([
            ("name", Value::from(upload.name.as_str())),
            ("type", Value::from(upload.mime_type.as_str())),
            ("bits", Value::Base64(upload.bytes.clone())),
            ("overwrite", Value::Bool(false)),
        ]);
        debug!(
            "Uploading {} ({} bytes, {})",
            upload.name,
            upload.bytes.len(),
            upload.mime_type
        );
        let value = self.call("wp.uploadFile", self.blog_params(data)).await?;
        media_item(&value)
    }

    fn blog_params(&self, payload: Value) -> Vec<Value> {
        let [username, password] = self.credential.rpc_params();
        vec![Value::Int(DEFAULT_BLOG_ID), username, password, payload]
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, OperationError> {
        let request = RpcRequest::new(self.endpoint.clone(), method, params)
            .with_bearer(self.credential.bearer_token());
        self.transport.call(request).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("credential", &self.credential)
            .finish()
    }
}
