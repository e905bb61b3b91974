//! Public storefront
//!
//! Reached directly or through the Host Router rewrite
//! (`pizza-hut.bringthemenu.com/table/5` → `/restaurant/pizza-hut/table/5`).
//! `{slug}` also accepts the restaurant id.

use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use shared::models::{MenuCategory, Restaurant, RestaurantProfile, RestaurantSettings};
use shared::order::{Order, PlaceOrderRequest};

use crate::services::orders::clean_table;
use crate::state::{AppState, Backend};

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurant/{slug}", get(storefront))
        // `/` on a tenant host rewrites to this
        .route("/restaurant/{slug}/", get(storefront))
        .route("/restaurant/{slug}/menu", get(menu))
        .route("/restaurant/{slug}/table/{table}", get(table))
        .route(
            "/restaurant/{slug}/table/{table}/orders",
            axum::routing::post(place_order),
        )
}

/// What diners may see of a restaurant
#[derive(Debug, Serialize)]
pub struct PublicRestaurant {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub settings: RestaurantSettings,
    pub profile: RestaurantProfile,
}

impl From<Restaurant> for PublicRestaurant {
    fn from(r: Restaurant) -> Self {
        Self {
            id: r.id,
            slug: r.slug,
            name: r.name,
            settings: r.settings,
            profile: r.profile,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StorefrontView {
    pub restaurant: PublicRestaurant,
    /// Set on table pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub menu: Vec<MenuCategory>,
}

async fn load(backend: &Backend, slug: &str, table: Option<String>) -> ApiResult<StorefrontView> {
    let restaurant = backend.tenants.resolve_storefront(slug).await?;
    let menu = backend.menu.public_menu(&restaurant.id).await?;
    Ok(Json(StorefrontView {
        restaurant: restaurant.into(),
        table,
        menu,
    }))
}

/// GET /restaurant/{slug}
pub async fn storefront(backend: Backend, Path(slug): Path<String>) -> ApiResult<StorefrontView> {
    load(&backend, &slug, None).await
}

/// GET /restaurant/{slug}/menu: available items by category
pub async fn menu(backend: Backend, Path(slug): Path<String>) -> ApiResult<Vec<MenuCategory>> {
    let restaurant = backend.tenants.resolve_storefront(&slug).await?;
    Ok(Json(backend.menu.public_menu(&restaurant.id).await?))
}

/// GET /restaurant/{slug}/table/{table}
pub async fn table(
    backend: Backend,
    Path((slug, table)): Path<(String, String)>,
) -> ApiResult<StorefrontView> {
    let table = clean_table(&table)?;
    load(&backend, &slug, Some(table)).await
}

/// POST /restaurant/{slug}/table/{table}/orders
pub async fn place_order(
    backend: Backend,
    Path((slug, table)): Path<(String, String)>,
    Json(req): Json<PlaceOrderRequest>,
) -> ApiResult<Order> {
    let restaurant = backend.tenants.resolve_storefront(&slug).await?;
    let order = backend
        .orders
        .place_order(&restaurant.id, &table, req)
        .await?;
    Ok(Json(order))
}
