//! Owner sign-up, sign-in, sign-out and password reset

use axum::routing::post;
use axum::{Extension, Json, Router, middleware};
use serde::Deserialize;

use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::auth::tenant_auth::{TenantIdentity, tenant_auth_middleware};
use crate::services::AuthSession;
use crate::state::{AppState, Backend};

use super::ApiResult;

pub fn router(state: &AppState) -> Router<AppState> {
    let sign_up = Router::new()
        .route("/api/auth/sign-up", post(sign_up))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            register_rate_limit,
        ));

    let sign_in = Router::new()
        .route("/api/auth/sign-in", post(sign_in))
        .route("/api/auth/google", post(google))
        .route("/api/auth/reset-password", post(reset_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ));

    let sign_out = Router::new()
        .route("/api/auth/sign-out", post(sign_out))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_auth_middleware,
        ));

    Router::new().merge(sign_up).merge(sign_in).merge(sign_out)
}

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub restaurant_name: String,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct GoogleSignInRequest {
    pub id_token: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// POST /api/auth/sign-up
pub async fn sign_up(backend: Backend, Json(req): Json<SignUpRequest>) -> ApiResult<AuthSession> {
    let session = backend
        .auth
        .sign_up(&req.email, &req.password, &req.restaurant_name)
        .await?;
    Ok(Json(session))
}

/// POST /api/auth/sign-in
pub async fn sign_in(backend: Backend, Json(req): Json<SignInRequest>) -> ApiResult<AuthSession> {
    let session = backend.auth.sign_in(&req.email, &req.password).await?;
    Ok(Json(session))
}

/// POST /api/auth/google
pub async fn google(
    backend: Backend,
    Json(req): Json<GoogleSignInRequest>,
) -> ApiResult<AuthSession> {
    let session = backend.auth.sign_in_with_google(&req.id_token).await?;
    Ok(Json(session))
}

/// POST /api/auth/sign-out
pub async fn sign_out(
    backend: Backend,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<serde_json::Value> {
    backend.auth.sign_out(&identity).await;
    Ok(Json(serde_json::json!({ "signed_out": true })))
}

/// POST /api/auth/reset-password
///
/// Answers the same for known and unknown addresses.
pub async fn reset_password(
    backend: Backend,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<serde_json::Value> {
    backend.auth.reset_password(&req.email).await?;
    Ok(Json(serde_json::json!({
        "message": "If an account exists for this address, a reset link has been sent"
    })))
}
