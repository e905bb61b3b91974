//! Order management (owner)

use axum::extract::{Path, Query};
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use serde::Deserialize;
use shared::order::{DeclineRequest, Order, OrderStatus, StatusChangeRequest};

use crate::auth::tenant_auth::{TenantIdentity, tenant_auth_middleware};
use crate::state::{AppState, Backend};

use super::ApiResult;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders))
        .route("/api/orders/{id}", get(get_order).delete(delete_order))
        .route("/api/orders/{id}/status", post(change_status))
        .route("/api/orders/{id}/decline", post(decline_order))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_auth_middleware,
        ))
}

#[derive(Deserialize)]
pub struct OrdersQuery {
    pub status: Option<OrderStatus>,
}

/// GET /api/orders?status=pending: newest first
pub async fn list_orders(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
    Query(query): Query<OrdersQuery>,
) -> ApiResult<Vec<Order>> {
    let orders = backend
        .orders
        .list(&identity.tenant_id, query.status)
        .await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn get_order(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Order> {
    Ok(Json(backend.orders.get(&identity.tenant_id, id).await?))
}

/// POST /api/orders/{id}/status
pub async fn change_status(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<StatusChangeRequest>,
) -> ApiResult<Order> {
    let order = backend
        .orders
        .transition(&identity.tenant_id, id, req.status)
        .await?;
    Ok(Json(order))
}

/// POST /api/orders/{id}/decline
pub async fn decline_order(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<DeclineRequest>,
) -> ApiResult<Order> {
    let order = backend
        .orders
        .decline(&identity.tenant_id, id, &req.reason)
        .await?;
    Ok(Json(order))
}

/// DELETE /api/orders/{id}: terminal orders only
pub async fn delete_order(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    backend.orders.delete(&identity.tenant_id, id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
