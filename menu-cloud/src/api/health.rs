//! Health check and landing page

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(landing))
}

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "menu-cloud",
        "version": env!("CARGO_PKG_VERSION"),
        "git_hash": option_env!("GIT_HASH").unwrap_or("dev"),
        "mode": if state.backend.is_none() { "landing" } else { "full" },
    }))
}

/// GET / on the root domain
pub async fn landing(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><title>Bring The Menu</title></head>\
         <body><h1>Bring The Menu</h1>\
         <p>Digital menus and table ordering for restaurants.</p>\
         <p>Your storefront lives at <code>your-restaurant.{}</code>.</p>\
         </body></html>",
        state.config.root_domain
    ))
}
