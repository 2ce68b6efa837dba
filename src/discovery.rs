//! Finding a site's XML-RPC endpoint from whatever address a user typed.
//!
//! Strategies run strictly in order and the first one to answer wins:
//!
//! 1. `<site>/xmlrpc.php`, the common case for a proper site address
//! 2. the address itself, in case the user already gave us the endpoint
//! 3. the `EditURI` link advertised in the site's HTML
//!
//! Which step failed, and why, is not reported.

use std::sync::Arc;

use async_trait::async_trait;
use html_escape::decode_html_entities;
use log::{debug, info};
use regex::Regex;
use url::Url;

use crate::api::DiscoveryError;
use crate::common::constants::XMLRPC_PATH;
use crate::xmlrpc::{DocumentFetcher, RpcRequest, RpcTransport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub site: String,
    pub endpoint: Url,
}

pub struct ProbeContext<'a> {
    pub transport: &'a dyn RpcTransport,
    pub fetcher: &'a dyn DocumentFetcher,
}

#[async_trait]
pub trait ProbeStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn probe(&self, site: &Url, ctx: &ProbeContext<'_>) -> Option<Url>;
}

pub struct ConventionalPath;

pub struct SiteAsEndpoint;

pub struct DiscoveryLink;

#[async_trait]
impl ProbeStrategy for ConventionalPath {
    fn name(&self) -> &'static str {
        "conventional path"
    }

    async fn probe(&self, site: &Url, ctx: &ProbeContext<'_>) -> Option<Url> {
        let candidate = conventional_endpoint(site)?;
        answers_rpc(ctx.transport, &candidate).await.then_some(candidate)
    }
}

#[async_trait]
impl ProbeStrategy for SiteAsEndpoint {
    fn name(&self) -> &'static str {
        "site as endpoint"
    }

    async fn probe(&self, site: &Url, ctx: &ProbeContext<'_>) -> Option<Url> {
        answers_rpc(ctx.transport, site).await.then(|| site.clone())
    }
}

#[async_trait]
impl ProbeStrategy for DiscoveryLink {
    fn name(&self) -> &'static str {
        "discovery link"
    }

    async fn probe(&self, site: &Url, ctx: &ProbeContext<'_>) -> Option<Url> {
        match ctx.fetcher.fetch(site).await {
            Ok(document) => find_edit_uri(&document, site),
            Err(err) => {
                debug!("Could not fetch {}: {}", site, err);
                None
            }
        }
    }
}

pub fn default_strategies() -> Vec<Box<dyn ProbeStrategy>> {
    vec![
        Box::new(ConventionalPath),
        Box::new(SiteAsEndpoint),
        Box::new(DiscoveryLink),
    ]
}

pub struct EndpointResolver {
    transport: Arc<dyn RpcTransport>,
    fetcher: Arc<dyn DocumentFetcher>,
    strategies: Vec<Box<dyn ProbeStrategy>>,
}

impl EndpointResolver {
    pub fn new(transport: Arc<dyn RpcTransport>, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self::with_strategies(transport, fetcher, default_strategies())
    }

    pub fn with_strategies(
        transport: Arc<dyn RpcTransport>,
        fetcher: Arc<dyn DocumentFetcher>,
        strategies: Vec<Box<dyn ProbeStrategy>>,
    ) -> Self {
        Self {
            transport,
            fetcher,
            strategies,
        }
    }

    pub async fn resolve(&self, site: &str) -> Result<Discovery, DiscoveryError> {
        let failed = || DiscoveryError {
            site: site.to_string(),
        };
        let site_url = parse_site(site).ok_or_else(failed)?;
        let ctx = ProbeContext {
            transport: self.transport.as_ref(),
            fetcher: self.fetcher.as_ref(),
        };

        for strategy in &self.strategies {
            debug!("Discovery of {}: trying {}", site_url, strategy.name());
            if let Some(endpoint) = strategy.probe(&site_url, &ctx).await {
                info!(
                    "Found XML-RPC endpoint for {} via {}: {}",
                    site,
                    strategy.name(),
                    endpoint
                );
                return Ok(Discovery {
                    site: site.to_string(),
                    endpoint,
                });
            }
        }

        debug!("Discovery of {} exhausted all strategies", site);
        Err(failed())
    }
}

fn parse_site(site: &str) -> Option<Url> {
    let trimmed = site.trim();
    if trimmed.is_empty() {
        return None;
    }
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        _ => Url::parse(&format!("http://{}", trimmed))
            .ok()
            .filter(|url| url.host_str().is_some()),
    }
}

fn conventional_endpoint(site: &Url) -> Option<Url> {
    let base = site.as_str().split(['?', '#']).next().unwrap_or("");
    Url::parse(&format!("{}/{}", base.trim_end_matches('/'), XMLRPC_PATH)).ok()
}

async fn answers_rpc(transport: &dyn RpcTransport, endpoint: &Url) -> bool {
    let request = RpcRequest::new(endpoint.clone(), "system.listMethods", Vec::new());
    match transport.call(request).await {
        Ok(_) => true,
        Err(err) if err.is_fault() => true,
        Err(err) => {
            debug!("{} did not answer XML-RPC: {}", endpoint, err);
            false
        }
    }
}

thread_local! {
    static LINK_TAG_RE: Regex = Regex::new(r"(?is)<link\b[^>]*>").unwrap();
    static REL_EDIT_URI_RE: Regex =
        Regex::new(r#"(?i)\brel\s*=\s*(?:"\s*edituri\s*"|'\s*edituri\s*'|edituri\b)"#).unwrap();
    static HREF_RE: Regex =
        Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#).unwrap();
}

pub fn find_edit_uri(document: &str, page: &Url) -> Option<Url> {
    let tags: Vec<String> = LINK_TAG_RE.with(|re| {
        re.find_iter(document)
            .map(|m| m.as_str().to_string())
            .collect()
    });

    tags.iter()
        .filter(|tag| REL_EDIT_URI_RE.with(|re| re.is_match(tag)))
        .find_map(|tag| {
            let href = HREF_RE.with(|re| {
                re.captures(tag).and_then(|caps| {
                    caps.get(1)
                        .or_else(|| caps.get(2))
                        .or_else(|| caps.get(3))
                        .map(|m| m.as_str().to_string())
                })
            })?;
            let href = decode_html_entities(href.trim()).to_string();
            if href.is_empty() {
                return None;
            }
            let mut url = page.join(&href).ok()?;
            if !matches!(url.scheme(), "http" | "https") {
                return None;
            }
            if url.query() == Some("rsd") {
                url.set_query(None);
            }
            Some(url)
        })
}
