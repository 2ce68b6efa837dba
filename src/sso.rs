use std::sync::Arc;

use log::debug;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::api::{ApiClient, OperationError};
use crate::common::constants::{SSO_AUTHORIZE_URL, SSO_CALLBACK_HOST};
use crate::xmlrpc::RpcTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatedAuth {
    pub endpoint: String,
    pub token: String,
}

impl DelegatedAuth {
    pub fn into_client(self, transport: Arc<dyn RpcTransport>) -> Result<ApiClient, OperationError> {
        let endpoint = Url::parse(&self.endpoint).map_err(|e| {
            OperationError::malformed(format!("invalid endpoint '{}': {}", self.endpoint, e))
        })?;
        Ok(ApiClient::with_token(endpoint, self.token, transport))
    }
}

#[derive(Debug, Clone)]
pub struct CallbackParser {
    scheme: String,
}

impl CallbackParser {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
        }
    }

    /// `None` means "not ours"; hand the locator to the next handler.
    pub fn parse(&self, locator: &str) -> Option<DelegatedAuth> {
        let url = Url::parse(locator.trim()).ok()?;
        let host = url.host_str()?;
        if url.scheme() != self.scheme || !host.eq_ignore_ascii_case(SSO_CALLBACK_HOST) {
            return None;
        }

        let endpoint = first_param(&url, "xmlrpc")?;
        let token = first_param(&url, "token")?;
        debug!("Accepted delegated-auth callback for {}", endpoint);
        Some(DelegatedAuth { endpoint, token })
    }
}

// Plain percent-decoding: a literal `+` stays a `+`.
fn first_param(url: &Url, key: &str) -> Option<String> {
    let raw = url.query()?.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        (percent_decode_str(name).decode_utf8().ok()? == key).then_some(value)
    })?;
    let value = percent_decode_str(raw).decode_utf8().ok()?;
    (!value.is_empty()).then(|| value.into_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub secret: String,
    pub callback: String,
}

pub fn authorization_url(request: &AuthorizationRequest) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(SSO_AUTHORIZE_URL)?;
    url.query_pairs_mut()
        .append_pair("client_id", &request.client_id)
        .append_pair("redirect_uri", &request.redirect_uri)
        .append_pair("secret", &request.secret)
        .append_pair("callback", &request.callback);
    Ok(url)
}
