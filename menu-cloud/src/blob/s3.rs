//! S3-backed blob store

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;

use super::{BlobError, BlobResult, BlobStore, check_key};

#[derive(Clone)]
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3BlobStore {
    /// `public_base_url` defaults to the bucket's virtual-hosted endpoint.
    pub fn new(
        client: S3Client,
        bucket: impl Into<String>,
        public_base_url: Option<String>,
    ) -> Self {
        let bucket = bucket.into();
        let public_base_url = public_base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://{bucket}.s3.amazonaws.com"));
        Self {
            client,
            bucket,
            public_base_url,
        }
    }

    /// Client from the default AWS credential chain
    pub async fn from_env(bucket: impl Into<String>, public_base_url: Option<String>) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(S3Client::new(&aws_config), bucket, public_base_url)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> BlobResult<String> {
        check_key(key)?;
        // Content-addressed keys make re-uploads idempotent
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(bytes.into())
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| BlobError::Backend(e.into()))?;
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        check_key(key)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| BlobError::Backend(e.into()))?;
        Ok(())
    }

    fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}
