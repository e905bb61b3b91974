//! HTTP API for menu-cloud
//!
//! Each module exposes `router()`; [`build_app`] merges them and adds the
//! tower-http layers. [`build_service`] puts the Host Router in front so
//! the rewrite happens before axum matches any route.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod live_ws;
pub mod menu;
pub mod orders;
pub mod restaurant;
pub mod storefront;
pub mod tables;

use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use http::{HeaderName, HeaderValue};
use shared::error::AppError;
use tower::Layer;
use tower::util::{MapRequest, MapRequestLayer};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::host_router::{HostRouter, rewrite_layer_fn};
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Every route, no middleware
pub fn build_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(storefront::router())
        .merge(auth::router(state))
        .merge(restaurant::router(state))
        .merge(menu::router(state))
        .merge(orders::router(state))
        .merge(dashboard::router(state))
        .merge(tables::router(state))
        .merge(live_ws::router())
}

/// Router with middleware and state
pub fn build_app(state: AppState) -> Router {
    build_router(&state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}

/// [`build_app`] behind the Host Router rewrite
pub fn build_service(
    state: AppState,
) -> MapRequest<Router, impl Fn(Request) -> Request + Clone> {
    let host_router = Arc::new(HostRouter::new(
        state.config.root_domain.clone(),
        state.config.preview_domain_suffixes.clone(),
    ));
    MapRequestLayer::new(rewrite_layer_fn(host_router)).layer(build_app(state))
}
