//! Async client for WordPress sites speaking XML-RPC.
//!
//! Typical flow: discover the endpoint from the address a user typed,
//! build an [`ApiClient`] with password or delegated-token credentials,
//! then publish or list posts.

pub mod api;
pub mod auth;
pub mod common;
pub mod composer;
pub mod discovery;
pub mod settings;
pub mod sso;
pub mod xmlrpc;

#[cfg(test)]
mod test_support;

pub use api::{
    spawn_on, ApiClient, DiscoveryError, ErrorDomain, MediaUpload, OperationError, Pending, Post,
    PostSummary, PublishResult,
};
pub use auth::Credential;
pub use composer::{compose, Attachment, MediaItem};
pub use discovery::{Discovery, EndpointResolver, ProbeStrategy};
pub use settings::Settings;
pub use sso::{CallbackParser, DelegatedAuth};
pub use xmlrpc::{DocumentFetcher, HttpTransport, RpcRequest, RpcTransport, Value};
