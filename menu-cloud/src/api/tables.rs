//! Table links for QR codes (owner)
//!
//! Tables are not stored; a link is just the storefront URL for a table id.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use serde::Serialize;

use crate::auth::tenant_auth::{TenantIdentity, tenant_auth_middleware};
use crate::services::orders::clean_table;
use crate::state::{AppState, Backend};

use super::ApiResult;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/tables/{table}/link", get(table_link))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_auth_middleware,
        ))
}

#[derive(Debug, Serialize)]
pub struct TableLink {
    pub table: String,
    pub url: String,
}

/// `https://{slug}.{root}/table/{table}`
pub fn table_url(slug: &str, root_domain: &str, table: &str) -> String {
    format!("https://{slug}.{root_domain}/table/{table}")
}

/// GET /api/tables/{table}/link
pub async fn table_link(
    State(state): State<AppState>,
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
    Path(table): Path<String>,
) -> ApiResult<TableLink> {
    let table = clean_table(&table)?;
    let restaurant = backend.tenants.get(&identity.tenant_id).await?;
    let url = table_url(&restaurant.slug, &state.config.root_domain, &table);
    Ok(Json(TableLink { table, url }))
}
