//! Blob Store: menu item images
//!
//! Objects are addressed by key (`menus/{tenant}/{hash}.jpg`); callers keep
//! the public URL returned by [`BlobStore::upload`] and can map it back to
//! its key with [`BlobStore::key_from_url`].

pub mod memory;
pub mod s3;

pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::BoxError;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("blob backend error: {0}")]
    Backend(BoxError),
}

pub type BlobResult<T> = Result<T, BlobError>;

#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Store `bytes` under `key`, returning the public URL.
    async fn upload(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> BlobResult<String>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> BlobResult<()>;

    /// Prefix every public URL starts with (no trailing slash)
    fn public_base_url(&self) -> &str;

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url())
    }

    /// Inverse of [`BlobStore::public_url`]; `None` for foreign URLs.
    fn key_from_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(self.public_base_url())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}

/// Reject keys that could escape their prefix.
pub fn check_key(key: &str) -> BlobResult<()> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if bad {
        return Err(BlobError::InvalidKey(key.to_string()));
    }
    Ok(())
}
