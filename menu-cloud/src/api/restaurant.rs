//! Restaurant profile and settings (owner)

use axum::routing::{get, put};
use axum::{Extension, Json, Router, middleware};
use shared::models::{Restaurant, RestaurantUpdate, SettingsUpdate};

use crate::auth::tenant_auth::{TenantIdentity, tenant_auth_middleware};
use crate::state::{AppState, Backend};

use super::ApiResult;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/restaurant", get(get_restaurant).put(update_restaurant))
        .route("/api/restaurant/settings", put(update_settings))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_auth_middleware,
        ))
}

/// GET /api/restaurant
pub async fn get_restaurant(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<Restaurant> {
    Ok(Json(backend.tenants.get(&identity.tenant_id).await?))
}

/// PUT /api/restaurant
pub async fn update_restaurant(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
    Json(update): Json<RestaurantUpdate>,
) -> ApiResult<Restaurant> {
    let restaurant = backend
        .tenants
        .update_profile(&identity.tenant_id, update)
        .await?;
    Ok(Json(restaurant))
}

/// PUT /api/restaurant/settings
pub async fn update_settings(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Restaurant> {
    let restaurant = backend
        .tenants
        .update_settings(&identity.tenant_id, update)
        .await?;
    Ok(Json(restaurant))
}
