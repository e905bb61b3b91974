//! Menu item images
//!
//! upload → validate → JPEG compress → SHA256 → blob store
//!
//! Objects live at `menus/{tenant_id}/{hash}.jpg`, so identical uploads
//! share one object.

use std::io::Cursor;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use sha2::{Digest, Sha256};
use shared::error::{AppError, ErrorCode};
use shared::models::MenuItem;

use crate::blob::BlobStore;
use crate::error::ServiceResult;
use crate::services::menu::MenuService;

/// Maximum file size (20MB)
pub const MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

const JPEG_QUALITY: u8 = 85;

const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

fn image_key(tenant_id: &str, hash: &str) -> String {
    format!("menus/{tenant_id}/{hash}.jpg")
}

/// Validated, re-encoded upload ready for storage
#[derive(Debug)]
pub struct PreparedImage {
    pub jpeg: Vec<u8>,
    pub hash: String,
}

/// Check name/size, decode and re-encode as JPEG.
pub fn prepare_image(filename: &str, data: &[u8]) -> Result<PreparedImage, AppError> {
    if data.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File too large: {} bytes (max {MAX_FILE_SIZE})", data.len()),
        ));
    }

    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!("Unsupported format: {ext}. Supported: png, jpg, jpeg, webp"),
        ));
    }

    let img = image::load_from_memory(data).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidImageFile, format!("Invalid image: {e}"))
    })?;

    let mut jpeg = Vec::new();
    {
        let mut cursor = Cursor::new(&mut jpeg);
        let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        img.to_rgb8().write_with_encoder(encoder).map_err(|e| {
            tracing::error!(error = %e, "JPEG encoding failed");
            AppError::new(ErrorCode::ImageProcessingFailed)
        })?;
    }

    let hash = hex::encode(Sha256::digest(&jpeg));
    Ok(PreparedImage { jpeg, hash })
}

#[derive(Clone)]
pub struct ImageService {
    menu: MenuService,
    blobs: Arc<dyn BlobStore>,
}

impl ImageService {
    pub fn new(menu: MenuService, blobs: Arc<dyn BlobStore>) -> Self {
        Self { menu, blobs }
    }

    /// Store a new image for a menu item and point the item at it.
    pub async fn attach(
        &self,
        tenant_id: &str,
        item_id: i64,
        filename: &str,
        data: &[u8],
    ) -> ServiceResult<MenuItem> {
        // 404 before doing any image work
        self.menu.get(tenant_id, item_id).await?;

        let prepared = prepare_image(filename, data)?;
        let key = image_key(tenant_id, &prepared.hash);
        let url = self
            .blobs
            .upload(prepared.jpeg, &key, "image/jpeg")
            .await
            .map_err(|e| {
                tracing::error!(key = %key, error = %e, "Image upload failed");
                AppError::new(ErrorCode::FileStorageFailed)
            })?;

        let (item, previous) = self.menu.set_image(tenant_id, item_id, Some(url)).await?;
        tracing::info!(
            tenant_id = %tenant_id,
            item_id,
            hash = %prepared.hash,
            "Menu image uploaded"
        );

        if let Some(previous) = previous {
            self.discard(tenant_id, &previous).await;
        }
        Ok(item)
    }

    /// Clear an item's image.
    pub async fn detach(&self, tenant_id: &str, item_id: i64) -> ServiceResult<MenuItem> {
        let (item, previous) = self.menu.set_image(tenant_id, item_id, None).await?;
        if let Some(previous) = previous {
            self.discard(tenant_id, &previous).await;
        }
        Ok(item)
    }

    /// Delete a menu item together with its image.
    pub async fn delete_item(&self, tenant_id: &str, item_id: i64) -> ServiceResult<()> {
        let item = self.menu.delete(tenant_id, item_id).await?;
        if let Some(url) = item.image_url {
            self.discard(tenant_id, &url).await;
        }
        Ok(())
    }

    /// Best-effort removal of an image nobody references any more.
    ///
    /// Foreign URLs and keys outside the tenant's prefix are left alone.
    async fn discard(&self, tenant_id: &str, url: &str) {
        let Some(key) = self.blobs.key_from_url(url) else {
            return;
        };
        if !key.starts_with(&format!("menus/{tenant_id}/")) {
            return;
        }
        match self.menu.list(tenant_id).await {
            Ok(items) if items.iter().any(|i| i.image_url.as_deref() == Some(url)) => return,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(key = %key, error = ?e, "Skipping image cleanup");
                return;
            }
        }
        if let Err(e) = self.blobs.delete(&key).await {
            tracing::warn!(key = %key, error = %e, "Image cleanup failed");
        }
    }
}
