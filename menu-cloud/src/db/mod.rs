//! Document store access
//!
//! Every query is scoped by restaurant id. Two backends implement
//! [`Store`]: [`PgStore`] (PostgreSQL, JSONB documents) and
//! [`MemoryStore`] (in-process, used by tests and local runs).

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use shared::models::{MenuItem, Restaurant, UserRecord};
use shared::order::{Order, OrderStatus};
use thiserror::Error;

use crate::error::BoxError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// Unique constraint (owner, slug) violated
    #[error("{0} already exists")]
    Duplicate(String),

    /// Conditional write lost against a concurrent writer
    #[error("record changed concurrently")]
    Conflict,

    #[error("store backend error: {0}")]
    Backend(BoxError),
}

impl StoreError {
    pub fn backend(e: impl Into<BoxError>) -> Self {
        StoreError::Backend(e.into())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Backend(other.into()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Backend(e.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Record-oriented persistence for every tenant-scoped document.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    // ── Restaurants ──
    async fn find_restaurant(&self, id: &str) -> StoreResult<Option<Restaurant>>;
    async fn find_restaurant_by_owner(&self, owner_id: &str) -> StoreResult<Option<Restaurant>>;
    async fn find_restaurant_by_slug(&self, slug: &str) -> StoreResult<Option<Restaurant>>;
    /// `Duplicate` if the owner already has a restaurant or the slug is taken
    async fn insert_restaurant(&self, restaurant: &Restaurant) -> StoreResult<()>;
    async fn update_restaurant(&self, restaurant: &Restaurant) -> StoreResult<()>;

    // ── Menu items ──
    /// Oldest first
    async fn list_menu_items(&self, restaurant_id: &str) -> StoreResult<Vec<MenuItem>>;
    async fn find_menu_item(&self, restaurant_id: &str, id: i64) -> StoreResult<Option<MenuItem>>;
    async fn insert_menu_item(&self, item: &MenuItem) -> StoreResult<()>;
    async fn update_menu_item(&self, item: &MenuItem) -> StoreResult<()>;
    /// `false` if nothing was deleted
    async fn delete_menu_item(&self, restaurant_id: &str, id: i64) -> StoreResult<bool>;

    // ── Orders ──
    async fn insert_order(&self, order: &Order) -> StoreResult<()>;
    async fn find_order(&self, restaurant_id: &str, id: i64) -> StoreResult<Option<Order>>;
    /// Newest first by creation time, optionally restricted to one status
    async fn list_orders(
        &self,
        restaurant_id: &str,
        status: Option<OrderStatus>,
    ) -> StoreResult<Vec<Order>>;
    /// Persist `order` only if the stored status still equals `expected`.
    /// `Conflict` otherwise, `NotFound` if the order is gone.
    async fn update_order_if_status(&self, order: &Order, expected: OrderStatus)
    -> StoreResult<()>;
    async fn delete_order(&self, restaurant_id: &str, id: i64) -> StoreResult<bool>;

    // ── Login tracking ──
    async fn find_user_record(&self, user_id: &str) -> StoreResult<Option<UserRecord>>;
    async fn upsert_user_record(&self, record: &UserRecord) -> StoreResult<()>;
}
