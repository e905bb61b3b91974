//! Menu management (owner)
//!
//! POST /api/menu/{id}/image: multipart field `file` → JPEG → blob store

use axum::extract::{Multipart, Path};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router, middleware};
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};

use crate::auth::tenant_auth::{TenantIdentity, tenant_auth_middleware};
use crate::services::images::MAX_FILE_SIZE;
use crate::state::{AppState, Backend};

use super::ApiResult;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/menu", get(list_items).post(create_item))
        .route("/api/menu/{id}", put(update_item).delete(delete_item))
        .route(
            "/api/menu/{id}/image",
            post(upload_image)
                .delete(remove_image)
                // multipart framing on top of the file itself
                .layer(axum::extract::DefaultBodyLimit::max(MAX_FILE_SIZE + 64 * 1024)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_auth_middleware,
        ))
}

/// GET /api/menu: every item, including unavailable ones
pub async fn list_items(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<Vec<MenuItem>> {
    Ok(Json(backend.menu.list(&identity.tenant_id).await?))
}

/// POST /api/menu
pub async fn create_item(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
    Json(data): Json<MenuItemCreate>,
) -> ApiResult<MenuItem> {
    Ok(Json(backend.menu.create(&identity.tenant_id, data).await?))
}

/// PUT /api/menu/{id}
pub async fn update_item(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
    Json(data): Json<MenuItemUpdate>,
) -> ApiResult<MenuItem> {
    Ok(Json(backend.menu.update(&identity.tenant_id, id, data).await?))
}

/// DELETE /api/menu/{id}
pub async fn delete_item(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    backend.images.delete_item(&identity.tenant_id, id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// POST /api/menu/{id}/image
pub async fn upload_image(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<MenuItem> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::with_message(ErrorCode::InvalidRequest, format!("Multipart error: {e}"))
    })? {
        if matches!(field.name(), Some("file") | Some("")) {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(|e| {
                AppError::with_message(ErrorCode::InvalidRequest, format!("Read error: {e}"))
            })?;
            file = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let (filename, data) = file.ok_or_else(|| AppError::new(ErrorCode::NoFileProvided))?;
    let item = backend
        .images
        .attach(&identity.tenant_id, id, &filename, &data)
        .await?;
    Ok(Json(item))
}

/// DELETE /api/menu/{id}/image
pub async fn remove_image(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<MenuItem> {
    Ok(Json(backend.images.detach(&identity.tenant_id, id).await?))
}
