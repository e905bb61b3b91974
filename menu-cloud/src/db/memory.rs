//! In-process store

use async_trait::async_trait;
use shared::models::{MenuItem, Restaurant, UserRecord};
use shared::order::{Order, OrderStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{Store, StoreError, StoreResult};

/// Items and orders keep insertion order so records created within the
/// same millisecond still list deterministically.
#[derive(Default)]
struct Tables {
    restaurants: HashMap<String, Restaurant>,
    menu_items: Vec<MenuItem>,
    orders: Vec<Order>,
    users: HashMap<String, UserRecord>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_restaurant(&self, id: &str) -> StoreResult<Option<Restaurant>> {
        Ok(self.tables.read().await.restaurants.get(id).cloned())
    }

    async fn find_restaurant_by_owner(&self, owner_id: &str) -> StoreResult<Option<Restaurant>> {
        let tables = self.tables.read().await;
        Ok(tables
            .restaurants
            .values()
            .find(|r| r.owner_id == owner_id)
            .cloned())
    }

    async fn find_restaurant_by_slug(&self, slug: &str) -> StoreResult<Option<Restaurant>> {
        let tables = self.tables.read().await;
        Ok(tables.restaurants.values().find(|r| r.slug == slug).cloned())
    }

    async fn insert_restaurant(&self, restaurant: &Restaurant) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .restaurants
            .values()
            .any(|r| r.owner_id == restaurant.owner_id)
        {
            return Err(StoreError::Duplicate("restaurant for owner".into()));
        }
        if tables.restaurants.values().any(|r| r.slug == restaurant.slug) {
            return Err(StoreError::Duplicate(format!("slug {}", restaurant.slug)));
        }
        tables
            .restaurants
            .insert(restaurant.id.clone(), restaurant.clone());
        Ok(())
    }

    async fn update_restaurant(&self, restaurant: &Restaurant) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.restaurants.get_mut(&restaurant.id) {
            Some(existing) => {
                *existing = restaurant.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_menu_items(&self, restaurant_id: &str) -> StoreResult<Vec<MenuItem>> {
        let tables = self.tables.read().await;
        let mut items: Vec<MenuItem> = tables
            .menu_items
            .iter()
            .filter(|i| i.restaurant_id == restaurant_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.created_at);
        Ok(items)
    }

    async fn find_menu_item(&self, restaurant_id: &str, id: i64) -> StoreResult<Option<MenuItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .menu_items
            .iter()
            .find(|i| i.id == id && i.restaurant_id == restaurant_id)
            .cloned())
    }

    async fn insert_menu_item(&self, item: &MenuItem) -> StoreResult<()> {
        self.tables.write().await.menu_items.push(item.clone());
        Ok(())
    }

    async fn update_menu_item(&self, item: &MenuItem) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables
            .menu_items
            .iter_mut()
            .find(|i| i.id == item.id && i.restaurant_id == item.restaurant_id)
        {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete_menu_item(&self, restaurant_id: &str, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.menu_items.len();
        tables
            .menu_items
            .retain(|i| !(i.id == id && i.restaurant_id == restaurant_id));
        Ok(tables.menu_items.len() < before)
    }

    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        self.tables.write().await.orders.push(order.clone());
        Ok(())
    }

    async fn find_order(&self, restaurant_id: &str, id: i64) -> StoreResult<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .find(|o| o.id == id && o.restaurant_id == restaurant_id)
            .cloned())
    }

    async fn list_orders(
        &self,
        restaurant_id: &str,
        status: Option<OrderStatus>,
    ) -> StoreResult<Vec<Order>> {
        let tables = self.tables.read().await;
        // newest insert first, then a stable sort keeps that for equal timestamps
        let mut orders: Vec<Order> = tables
            .orders
            .iter()
            .rev()
            .filter(|o| o.restaurant_id == restaurant_id)
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn update_order_if_status(
        &self,
        order: &Order,
        expected: OrderStatus,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .orders
            .iter_mut()
            .find(|o| o.id == order.id && o.restaurant_id == order.restaurant_id)
            .ok_or(StoreError::NotFound)?;
        if existing.status != expected {
            return Err(StoreError::Conflict);
        }
        *existing = order.clone();
        Ok(())
    }

    async fn delete_order(&self, restaurant_id: &str, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.orders.len();
        tables
            .orders
            .retain(|o| !(o.id == id && o.restaurant_id == restaurant_id));
        Ok(tables.orders.len() < before)
    }

    async fn find_user_record(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(user_id).cloned())
    }

    async fn upsert_user_record(&self, record: &UserRecord) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .users
            .insert(record.user_id.clone(), record.clone());
        Ok(())
    }
}
