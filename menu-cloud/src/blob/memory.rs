//! In-process blob store

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::{BlobResult, BlobStore, check_key};

const MEMORY_BASE_URL: &str = "memory://blobs";

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<DashMap<String, StoredBlob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<StoredBlob> {
        self.objects.get(key).map(|blob| blob.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> BlobResult<String> {
        check_key(key)?;
        self.objects.insert(
            key.to_string(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        check_key(key)?;
        self.objects.remove(key);
        Ok(())
    }

    fn public_base_url(&self) -> &str {
        MEMORY_BASE_URL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_and_delete() {
        let store = MemoryBlobStore::new();
        let url = store
            .upload(vec![1, 2, 3], "menus/t1/a.jpg", "image/jpeg")
            .await
            .unwrap();
        assert_eq!(url, "memory://blobs/menus/t1/a.jpg");
        assert_eq!(store.get("menus/t1/a.jpg").unwrap().bytes, [1, 2, 3]);

        store.delete("menus/t1/a.jpg").await.unwrap();
        store.delete("menus/t1/a.jpg").await.unwrap();
        assert!(store.is_empty());
    }
}
