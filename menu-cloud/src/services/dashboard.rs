//! Dashboard Aggregator
//!
//! Recomputes the four summary numbers from the restaurant's orders on
//! every call. There are no counters to drift; values are at most one
//! refresh interval stale on the live feed.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use shared::models::{DashboardSnapshot, DashboardStats};
use shared::order::{Order, OrderStatus, money};
use shared::util::now_millis;

use crate::db::Store;

/// Pure aggregation over one restaurant's orders.
///
/// "Today" is `created_at >= day_start_millis`.
pub fn compute_stats(orders: &[Order], day_start_millis: i64) -> DashboardStats {
    let mut tables: HashSet<&str> = HashSet::new();
    let mut stats = DashboardStats::default();

    for order in orders {
        if order.status.is_open() {
            stats.pending_orders += 1;
            tables.insert(order.table_number.as_str());
        }
        if order.created_at >= day_start_millis {
            stats.todays_orders += 1;
            if order.status != OrderStatus::Cancelled {
                stats.todays_revenue += order.total;
            }
        }
    }

    stats.active_tables = u32::try_from(tables.len()).unwrap_or(u32::MAX);
    stats.todays_revenue = money::round_money(stats.todays_revenue);
    stats
}

/// Local midnight of the day containing `now_millis`, in epoch millis.
///
/// Falls back to UTC midnight when the local midnight does not exist
/// (DST gap).
pub fn local_day_start(now_millis: i64) -> i64 {
    let Some(now_utc) = DateTime::<Utc>::from_timestamp_millis(now_millis) else {
        return 0;
    };
    let local_date = now_utc.with_timezone(&Local).date_naive();
    let midnight = local_date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight).earliest() {
        Some(start) => start.timestamp_millis(),
        None => now_utc
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp_millis(),
    }
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn Store>,
    refresh_interval_secs: u64,
}

impl DashboardService {
    pub fn new(store: Arc<dyn Store>, refresh_interval_secs: u64) -> Self {
        Self {
            store,
            refresh_interval_secs,
        }
    }

    pub fn refresh_interval_secs(&self) -> u64 {
        self.refresh_interval_secs
    }

    /// Current stats. A failed read is logged and yields zeroes.
    pub async fn snapshot(&self, tenant_id: &str) -> DashboardSnapshot {
        let now = now_millis();
        self.snapshot_at(tenant_id, now, local_day_start(now)).await
    }

    pub async fn snapshot_at(
        &self,
        tenant_id: &str,
        now: i64,
        day_start_millis: i64,
    ) -> DashboardSnapshot {
        let stats = match self.store.list_orders(tenant_id, None).await {
            Ok(orders) => compute_stats(&orders, day_start_millis),
            Err(e) => {
                tracing::warn!(tenant_id = %tenant_id, error = %e, "Dashboard stats read failed");
                DashboardStats::default()
            }
        };
        DashboardSnapshot {
            stats,
            computed_at: now,
            refresh_interval_secs: self.refresh_interval_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, StoreError, StoreResult};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shared::models::{MenuItem, Restaurant, UserRecord};
    use shared::order::LineItem;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    /// 2025-03-10 00:00:00 UTC
    const TODAY: i64 = 1_741_564_800_000;

    fn order(id: i64, table: &str, items: Vec<LineItem>, created_at: i64) -> Order {
        Order::new(id, "acme", table, items, created_at).unwrap()
    }

    fn item(name: &str, cents: i64, quantity: u32) -> LineItem {
        LineItem {
            menu_item_id: 1,
            name: name.into(),
            price: Decimal::new(cents, 2),
            quantity,
        }
    }

    #[test]
    fn acme_scenario() {
        let a = order(1, "5", vec![item("Margherita", 1099, 2)], TODAY + 3_600_000);
        let mut b = order(2, "3", vec![item("Coke", 299, 1)], TODAY - DAY_MS + 3_600_000);
        for status in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Completed] {
            b.transition(status, TODAY - DAY_MS + 7_200_000).unwrap();
        }

        let stats = compute_stats(&[a, b], TODAY);
        assert_eq!(stats.active_tables, 1);
        assert_eq!(stats.todays_orders, 1);
        assert_eq!(stats.todays_revenue, Decimal::new(2198, 2));
        assert_eq!(stats.pending_orders, 1);
    }

    #[test]
    fn both_orders_yesterday_means_no_revenue() {
        let yesterday = TODAY - DAY_MS + 1;
        let a = order(1, "5", vec![item("Margherita", 1099, 2)], yesterday);
        let stats = compute_stats(&[a], TODAY);
        assert_eq!(stats.todays_orders, 0);
        assert_eq!(stats.todays_revenue, Decimal::ZERO);
        // still open, so the table is still active
        assert_eq!(stats.active_tables, 1);
        assert_eq!(stats.pending_orders, 1);
    }

    #[test]
    fn cancelled_orders_excluded_from_revenue() {
        let mut declined = order(1, "5", vec![item("Soup", 500, 1)], TODAY + 1);
        declined.decline("Out of stock", TODAY + 2).unwrap();
        let kept = order(2, "6", vec![item("Tea", 250, 2)], TODAY + 3);

        let stats = compute_stats(&[declined, kept], TODAY);
        assert_eq!(stats.todays_orders, 2);
        assert_eq!(stats.todays_revenue, Decimal::new(500, 2));
        assert_eq!(stats.active_tables, 1);
    }

    #[test]
    fn tables_are_counted_once() {
        let orders = [
            order(1, "5", vec![item("A", 100, 1)], TODAY + 1),
            order(2, "5", vec![item("B", 100, 1)], TODAY + 2),
            order(3, "7", vec![item("C", 100, 1)], TODAY + 3),
        ];
        let stats = compute_stats(&orders, TODAY);
        assert_eq!(stats.active_tables, 2);
        assert_eq!(stats.pending_orders, 3);
    }

    #[test]
    fn local_day_start_is_not_after_now() {
        let now = now_millis();
        let start = local_day_start(now);
        assert!(start <= now);
        assert!(now - start < DAY_MS + 3_600_000);
    }

    /// Store whose every read fails
    struct BrokenStore;

    #[async_trait]
    impl Store for BrokenStore {
        async fn find_restaurant(&self, _: &str) -> StoreResult<Option<Restaurant>> {
            Err(StoreError::backend("down"))
        }
        async fn find_restaurant_by_owner(&self, _: &str) -> StoreResult<Option<Restaurant>> {
            Err(StoreError::backend("down"))
        }
        async fn find_restaurant_by_slug(&self, _: &str) -> StoreResult<Option<Restaurant>> {
            Err(StoreError::backend("down"))
        }
        async fn insert_restaurant(&self, _: &Restaurant) -> StoreResult<()> {
            Err(StoreError::backend("down"))
        }
        async fn update_restaurant(&self, _: &Restaurant) -> StoreResult<()> {
            Err(StoreError::backend("down"))
        }
        async fn list_menu_items(&self, _: &str) -> StoreResult<Vec<MenuItem>> {
            Err(StoreError::backend("down"))
        }
        async fn find_menu_item(&self, _: &str, _: i64) -> StoreResult<Option<MenuItem>> {
            Err(StoreError::backend("down"))
        }
        async fn insert_menu_item(&self, _: &MenuItem) -> StoreResult<()> {
            Err(StoreError::backend("down"))
        }
        async fn update_menu_item(&self, _: &MenuItem) -> StoreResult<()> {
            Err(StoreError::backend("down"))
        }
        async fn delete_menu_item(&self, _: &str, _: i64) -> StoreResult<bool> {
            Err(StoreError::backend("down"))
        }
        async fn insert_order(&self, _: &Order) -> StoreResult<()> {
            Err(StoreError::backend("down"))
        }
        async fn find_order(&self, _: &str, _: i64) -> StoreResult<Option<Order>> {
            Err(StoreError::backend("down"))
        }
        async fn list_orders(
            &self,
            _: &str,
            _: Option<OrderStatus>,
        ) -> StoreResult<Vec<Order>> {
            Err(StoreError::backend("down"))
        }
        async fn update_order_if_status(&self, _: &Order, _: OrderStatus) -> StoreResult<()> {
            Err(StoreError::backend("down"))
        }
        async fn delete_order(&self, _: &str, _: i64) -> StoreResult<bool> {
            Err(StoreError::backend("down"))
        }
        async fn find_user_record(&self, _: &str) -> StoreResult<Option<UserRecord>> {
            Err(StoreError::backend("down"))
        }
        async fn upsert_user_record(&self, _: &UserRecord) -> StoreResult<()> {
            Err(StoreError::backend("down"))
        }
    }

    #[tokio::test]
    async fn read_failure_yields_zeroes() {
        let svc = DashboardService::new(Arc::new(BrokenStore), 30);
        let snapshot = svc.snapshot("acme").await;
        assert_eq!(snapshot.stats, DashboardStats::default());
        assert_eq!(snapshot.refresh_interval_secs, 30);
    }

    #[tokio::test]
    async fn snapshot_reads_store() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_order(&order(1, "5", vec![item("Margherita", 1099, 2)], TODAY + 10))
            .await
            .unwrap();
        let svc = DashboardService::new(store, 30);
        let snapshot = svc.snapshot_at("acme", TODAY + 20, TODAY).await;
        assert_eq!(snapshot.stats.todays_revenue, Decimal::new(2198, 2));
        assert_eq!(snapshot.computed_at, TODAY + 20);
    }
}
