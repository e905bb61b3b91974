//! Dashboard summary (owner)

use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use shared::models::DashboardSnapshot;

use crate::auth::tenant_auth::{TenantIdentity, tenant_auth_middleware};
use crate::state::{AppState, Backend};

use super::ApiResult;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/dashboard/stats", get(stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_auth_middleware,
        ))
}

/// GET /api/dashboard/stats
pub async fn stats(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<DashboardSnapshot> {
    Ok(Json(backend.dashboard.snapshot(&identity.tenant_id).await))
}
