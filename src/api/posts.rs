use std::path::Path;

use anyhow::Context;
use chrono::NaiveDateTime;
use log::warn;
use url::Url;

use super::error::OperationError;
use crate::composer::{Attachment, MediaItem};
use crate::xmlrpc::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    pub title: Option<String>,
    pub content: Option<String>,
    pub attachment: Option<Attachment>,
}

impl Post {
    pub fn new(title: Option<&str>, content: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            content: content.map(str::to_string),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub id: u64,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub link: Option<String>,
    pub published: Option<NaiveDateTime>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read media file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| anyhow::anyhow!("Media path has no file name: {}", path.display()))?;
        Ok(Self {
            mime_type: mime_type_for(&name).to_string(),
            name,
            bytes,
        })
    }
}

pub fn mime_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

pub(crate) fn publish_result(value: &Value, endpoint: &Url) -> Result<PublishResult, OperationError> {
    if value.as_struct().is_some() {
        let id = value
            .get("post_id")
            .or_else(|| value.get("postid"))
            .and_then(Value::as_id)
            .ok_or_else(|| OperationError::malformed("publish result has no post id"))?;
        let address = value
            .non_empty_str("short_url")
            .or_else(|| value.non_empty_str("shortlink"))
            .or_else(|| value.non_empty_str("link"))
            .or_else(|| value.non_empty_str("permalink"))
            .map(str::to_string)
            .unwrap_or_else(|| default_permalink(endpoint, id));
        return Ok(PublishResult { id, address });
    }

    let id = value
        .as_id()
        .ok_or_else(|| OperationError::malformed("publish result is not a post id"))?;
    Ok(PublishResult {
        id,
        address: default_permalink(endpoint, id),
    })
}

pub(crate) fn default_permalink(endpoint: &Url, id: u64) -> String {
    let mut root = endpoint.join("./").unwrap_or_else(|_| endpoint.clone());
    root.set_query(Some(&format!("p={}", id)));
    root.set_fragment(None);
    root.to_string()
}

pub(crate) fn post_summaries(value: &Value) -> Result<Vec<PostSummary>, OperationError> {
    let items = value
        .as_array()
        .ok_or_else(|| OperationError::malformed("post list is not an array"))?;

    let mut posts = Vec::with_capacity(items.len());
    for item in items {
        match post_summary(item) {
            Some(post) => posts.push(post),
            None => warn!("Skipping post entry without an id"),
        }
    }
    Ok(posts)
}

fn post_summary(item: &Value) -> Option<PostSummary> {
    let id = item
        .get("post_id")
        .or_else(|| item.get("postid"))
        .and_then(Value::as_id)?;
    let text = |key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };
    Some(PostSummary {
        id,
        title: text("post_title"),
        content: text("post_content"),
        link: item.non_empty_str("link").map(str::to_string),
        published: item.get("post_date").and_then(Value::as_datetime),
        status: item.non_empty_str("post_status").map(str::to_string),
    })
}

pub(crate) fn media_item(value: &Value) -> Result<MediaItem, OperationError> {
    let id = value
        .get("id")
        .or_else(|| value.get("attachment_id"))
        .and_then(Value::as_id)
        .ok_or_else(|| OperationError::malformed("upload result has no id"))?;
    let url = value
        .non_empty_str("url")
        .or_else(|| value.non_empty_str("link"))
        .ok_or_else(|| OperationError::malformed("upload result has no url"))?;
    Ok(MediaItem {
        id,
        url: url.to_string(),
    })
}
