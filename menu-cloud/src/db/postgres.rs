//! PostgreSQL store (JSONB documents)

use async_trait::async_trait;
use shared::models::{MenuItem, Restaurant, UserRecord};
use shared::order::{Order, OrderStatus};
use sqlx::PgPool;
use sqlx::types::Json;

use super::{Store, StoreError, StoreResult};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and run pending migrations.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(Self { pool })
    }
}

fn unique_violation(e: sqlx::Error, what: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(what.to_string())
        }
        _ => e.into(),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_restaurant(&self, id: &str) -> StoreResult<Option<Restaurant>> {
        let row: Option<(Json<Restaurant>,)> =
            sqlx::query_as("SELECT doc FROM restaurants WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(doc,)| doc.0))
    }

    async fn find_restaurant_by_owner(&self, owner_id: &str) -> StoreResult<Option<Restaurant>> {
        let row: Option<(Json<Restaurant>,)> =
            sqlx::query_as("SELECT doc FROM restaurants WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(doc,)| doc.0))
    }

    async fn find_restaurant_by_slug(&self, slug: &str) -> StoreResult<Option<Restaurant>> {
        let row: Option<(Json<Restaurant>,)> =
            sqlx::query_as("SELECT doc FROM restaurants WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(doc,)| doc.0))
    }

    async fn insert_restaurant(&self, restaurant: &Restaurant) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO restaurants (id, owner_id, slug, doc, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&restaurant.id)
        .bind(&restaurant.owner_id)
        .bind(&restaurant.slug)
        .bind(Json(restaurant))
        .bind(restaurant.created_at)
        .bind(restaurant.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "restaurant"))?;
        Ok(())
    }

    async fn update_restaurant(&self, restaurant: &Restaurant) -> StoreResult<()> {
        let result = sqlx::query("UPDATE restaurants SET doc = $1, updated_at = $2 WHERE id = $3")
            .bind(Json(restaurant))
            .bind(restaurant.updated_at)
            .bind(&restaurant.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_menu_items(&self, restaurant_id: &str) -> StoreResult<Vec<MenuItem>> {
        let rows: Vec<(Json<MenuItem>,)> = sqlx::query_as(
            "SELECT doc FROM menu_items WHERE restaurant_id = $1 ORDER BY created_at, id",
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(doc,)| doc.0).collect())
    }

    async fn find_menu_item(&self, restaurant_id: &str, id: i64) -> StoreResult<Option<MenuItem>> {
        let row: Option<(Json<MenuItem>,)> =
            sqlx::query_as("SELECT doc FROM menu_items WHERE id = $1 AND restaurant_id = $2")
                .bind(id)
                .bind(restaurant_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(doc,)| doc.0))
    }

    async fn insert_menu_item(&self, item: &MenuItem) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO menu_items (id, restaurant_id, doc, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(item.id)
        .bind(&item.restaurant_id)
        .bind(Json(item))
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_menu_item(&self, item: &MenuItem) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE menu_items SET doc = $1 WHERE id = $2 AND restaurant_id = $3")
                .bind(Json(item))
                .bind(item.id)
                .bind(&item.restaurant_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_menu_item(&self, restaurant_id: &str, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1 AND restaurant_id = $2")
            .bind(id)
            .bind(restaurant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO orders (id, restaurant_id, status, doc, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(order.id)
        .bind(&order.restaurant_id)
        .bind(order.status.as_str())
        .bind(Json(order))
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_order(&self, restaurant_id: &str, id: i64) -> StoreResult<Option<Order>> {
        let row: Option<(Json<Order>,)> =
            sqlx::query_as("SELECT doc FROM orders WHERE id = $1 AND restaurant_id = $2")
                .bind(id)
                .bind(restaurant_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(doc,)| doc.0))
    }

    async fn list_orders(
        &self,
        restaurant_id: &str,
        status: Option<OrderStatus>,
    ) -> StoreResult<Vec<Order>> {
        let rows: Vec<(Json<Order>,)> = sqlx::query_as(
            "SELECT doc FROM orders
             WHERE restaurant_id = $1 AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC",
        )
        .bind(restaurant_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(doc,)| doc.0).collect())
    }

    async fn update_order_if_status(
        &self,
        order: &Order,
        expected: OrderStatus,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE orders SET status = $1, doc = $2, updated_at = $3
             WHERE id = $4 AND restaurant_id = $5 AND status = $6",
        )
        .bind(order.status.as_str())
        .bind(Json(order))
        .bind(order.updated_at)
        .bind(order.id)
        .bind(&order.restaurant_id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }
        // Distinguish "gone" from "someone else moved it first"
        match self.find_order(&order.restaurant_id, order.id).await? {
            Some(_) => Err(StoreError::Conflict),
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete_order(&self, restaurant_id: &str, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND restaurant_id = $2")
            .bind(id)
            .bind(restaurant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_user_record(&self, user_id: &str) -> StoreResult<Option<UserRecord>> {
        let row: Option<(Json<UserRecord>,)> =
            sqlx::query_as("SELECT doc FROM user_records WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(doc,)| doc.0))
    }

    async fn upsert_user_record(&self, record: &UserRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO user_records (user_id, doc) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET doc = EXCLUDED.doc",
        )
        .bind(&record.user_id)
        .bind(Json(record))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
