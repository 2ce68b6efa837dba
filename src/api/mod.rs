mod client;
mod completion;
pub mod error;
mod posts;

pub use client::ApiClient;
pub use completion::{spawn_on, Pending};
pub use error::{DiscoveryError, ErrorDomain, OperationError};
pub use posts::{mime_type_for, MediaUpload, Post, PostSummary, PublishResult};
