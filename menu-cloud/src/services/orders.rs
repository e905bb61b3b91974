//! Order Lifecycle Engine
//!
//! Create, transition, decline and delete orders, and serve live
//! full-snapshot feeds per restaurant.
//!
//! ```text
//! write ──► Store ──► OrderHub.publish ──► feed task ──► list_orders ──► OrderFeed
//! ```
//!
//! Feeds never apply diffs: every change notification triggers a re-read of
//! the restaurant's order set, so a delivery is always a consistent snapshot.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use shared::error::{AppError, ErrorCode};
use shared::order::{
    LineItem, Order, OrderRuleError, OrderStatus, PlaceOrderRequest, TransitionError,
};
use shared::util::{now_millis, snowflake_id};
use shared::validation::{MAX_REASON_LEN, MAX_TABLE_LEN, sanitize_string};

use crate::db::{Store, StoreError};
use crate::error::{BoxError, ServiceError};
use crate::live::{OrderChange, OrderHub};

/// Pending snapshots per feed; a slow consumer only ever sees the latest
const FEED_BUFFER: usize = 1;

/// Retry delay when a feed re-read fails
const FEED_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Rule(#[from] OrderRuleError),

    #[error("order not found")]
    NotFound,

    #[error("menu item {0} not found")]
    MenuItemNotFound(i64),

    #[error("menu item {0} is not available")]
    MenuItemUnavailable(i64),

    /// A concurrent writer changed the status first
    #[error("order changed concurrently")]
    Conflict,

    #[error("invalid table identifier")]
    InvalidTable,

    #[error("decline reason is too long")]
    ReasonTooLong,

    #[error("order backend error: {0}")]
    Backend(BoxError),
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => OrderError::NotFound,
            StoreError::Conflict => OrderError::Conflict,
            StoreError::Duplicate(what) => OrderError::Backend(format!("duplicate {what}").into()),
            StoreError::Backend(e) => OrderError::Backend(e),
        }
    }
}

impl From<OrderError> for ServiceError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::Backend(e) => ServiceError::Db(e),
            other => ServiceError::App(rule_app_error(other)),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        ServiceError::from(e).into()
    }
}

fn rule_app_error(e: OrderError) -> AppError {
    match e {
        OrderError::Rule(rule) => match rule {
            OrderRuleError::Empty => AppError::new(ErrorCode::OrderEmpty),
            OrderRuleError::InvalidQuantity { menu_item_id, max } => {
                AppError::new(ErrorCode::InvalidQuantity)
                    .with_detail("menu_item_id", menu_item_id)
                    .with_detail("max", max)
            }
            OrderRuleError::MissingTable => AppError::new(ErrorCode::InvalidTableId),
            OrderRuleError::Transition(TransitionError::Terminal(status)) => {
                AppError::new(ErrorCode::OrderTerminal).with_detail("status", status.as_str())
            }
            OrderRuleError::Transition(TransitionError::NotAllowed { from, to }) => {
                AppError::new(ErrorCode::InvalidStatusTransition)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            OrderRuleError::DeclineReasonRequired => {
                AppError::new(ErrorCode::DeclineReasonRequired)
            }
            OrderRuleError::NotTerminal(status) => {
                AppError::new(ErrorCode::OrderNotTerminal).with_detail("status", status.as_str())
            }
        },
        OrderError::NotFound => AppError::new(ErrorCode::OrderNotFound),
        OrderError::MenuItemNotFound(id) => {
            AppError::new(ErrorCode::MenuItemNotFound).with_detail("menu_item_id", id)
        }
        OrderError::MenuItemUnavailable(id) => {
            AppError::new(ErrorCode::MenuItemUnavailable).with_detail("menu_item_id", id)
        }
        OrderError::Conflict => AppError::new(ErrorCode::OrderConflict),
        OrderError::InvalidTable => AppError::new(ErrorCode::InvalidTableId),
        OrderError::ReasonTooLong => AppError::validation(format!(
            "Decline reason must be at most {MAX_REASON_LEN} characters"
        ))
        .with_detail("field", "reason"),
        OrderError::Backend(e) => {
            tracing::error!(error = %e, "Order backend error");
            AppError::backend_failure()
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;

/// Sanitised table identifier: non-blank, bounded, printable.
pub fn clean_table(table: &str) -> OrderResult<String> {
    let cleaned = sanitize_string(table);
    if cleaned.is_empty()
        || cleaned.chars().count() > MAX_TABLE_LEN
        || cleaned.chars().any(|c| c.is_control() || c == '/')
    {
        return Err(OrderError::InvalidTable);
    }
    Ok(cleaned)
}

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
    hub: OrderHub,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>, hub: OrderHub) -> Self {
        Self { store, hub }
    }

    pub fn hub(&self) -> &OrderHub {
        &self.hub
    }

    /// Create a pending order from line items already snapshotted by the caller.
    pub async fn create(
        &self,
        tenant_id: &str,
        table: &str,
        items: Vec<LineItem>,
    ) -> OrderResult<Order> {
        let table = clean_table(table)?;
        let order = Order::new(snowflake_id(), tenant_id, table, items, now_millis())?;
        self.store.insert_order(&order).await?;
        self.hub
            .publish(tenant_id, OrderChange::Created { order_id: order.id });

        tracing::info!(
            tenant_id = %tenant_id,
            order_id = order.id,
            table = %order.table_number,
            total = %order.total,
            "Order created"
        );
        Ok(order)
    }

    /// Diner checkout: snapshot name and price of each referenced menu item.
    ///
    /// Unknown, foreign or unavailable items reject the whole order.
    pub async fn place_order(
        &self,
        tenant_id: &str,
        table: &str,
        request: PlaceOrderRequest,
    ) -> OrderResult<Order> {
        // Cheap checks first: nothing hits the store for an obviously bad request
        clean_table(table)?;
        if request.items.is_empty() {
            return Err(OrderRuleError::Empty.into());
        }

        let mut items = Vec::with_capacity(request.items.len());
        for line in request.items {
            let menu_item = self
                .store
                .find_menu_item(tenant_id, line.menu_item_id)
                .await?
                .ok_or(OrderError::MenuItemNotFound(line.menu_item_id))?;
            if !menu_item.available {
                return Err(OrderError::MenuItemUnavailable(menu_item.id));
            }
            items.push(LineItem {
                menu_item_id: menu_item.id,
                name: menu_item.name,
                price: menu_item.price,
                quantity: line.quantity,
            });
        }

        self.create(tenant_id, table, items).await
    }

    pub async fn get(&self, tenant_id: &str, order_id: i64) -> OrderResult<Order> {
        self.store
            .find_order(tenant_id, order_id)
            .await?
            .ok_or(OrderError::NotFound)
    }

    /// Newest first, optionally one status only.
    pub async fn list(
        &self,
        tenant_id: &str,
        status: Option<OrderStatus>,
    ) -> OrderResult<Vec<Order>> {
        Ok(self.store.list_orders(tenant_id, status).await?)
    }

    /// Forward transition. Cancelling goes through [`OrderService::decline`].
    pub async fn transition(
        &self,
        tenant_id: &str,
        order_id: i64,
        target: OrderStatus,
    ) -> OrderResult<Order> {
        let mut order = self.get(tenant_id, order_id).await?;
        order
            .status
            .check_transition(target)
            .map_err(OrderRuleError::from)?;
        if target == OrderStatus::Cancelled {
            return Err(OrderRuleError::DeclineReasonRequired.into());
        }

        let from = order.transition(target, now_millis())?;
        self.commit_status(&order, from).await?;
        Ok(order)
    }

    /// pending → cancelled with a reason kept for display.
    pub async fn decline(
        &self,
        tenant_id: &str,
        order_id: i64,
        reason: &str,
    ) -> OrderResult<Order> {
        let reason = sanitize_string(reason);
        if reason.chars().count() > MAX_REASON_LEN {
            return Err(OrderError::ReasonTooLong);
        }
        if reason.is_empty() {
            return Err(OrderRuleError::DeclineReasonRequired.into());
        }

        let mut order = self.get(tenant_id, order_id).await?;
        let from = order.decline(&reason, now_millis())?;
        self.commit_status(&order, from).await?;
        Ok(order)
    }

    async fn commit_status(&self, order: &Order, from: OrderStatus) -> OrderResult<()> {
        self.store.update_order_if_status(order, from).await?;
        self.hub.publish(
            &order.restaurant_id,
            OrderChange::StatusChanged {
                order_id: order.id,
                status: order.status,
            },
        );
        tracing::info!(
            tenant_id = %order.restaurant_id,
            order_id = order.id,
            from = %from,
            to = %order.status,
            "Order status changed"
        );
        Ok(())
    }

    /// Only terminal orders can be deleted.
    pub async fn delete(&self, tenant_id: &str, order_id: i64) -> OrderResult<()> {
        let order = self.get(tenant_id, order_id).await?;
        order.ensure_deletable()?;
        if !self.store.delete_order(tenant_id, order_id).await? {
            return Err(OrderError::NotFound);
        }
        self.hub
            .publish(tenant_id, OrderChange::Deleted { order_id });
        tracing::info!(tenant_id = %tenant_id, order_id, "Order deleted");
        Ok(())
    }

    /// Live feed of the restaurant's full order set, newest first.
    ///
    /// The first delivery is the current set; each later one follows a
    /// change. Bursts of changes are coalesced into one delivery.
    pub fn subscribe(&self, tenant_id: &str, status: Option<OrderStatus>) -> OrderFeed {
        // Subscribe before the initial read so no change can slip between them
        let changes = self.hub.subscribe(tenant_id);
        let (tx, rx) = mpsc::channel(FEED_BUFFER);
        let cancel = CancellationToken::new();

        tokio::spawn(run_feed(FeedTask {
            store: self.store.clone(),
            hub: self.hub.clone(),
            tenant_id: tenant_id.to_string(),
            status,
            changes,
            tx,
            cancel: cancel.clone(),
        }));

        OrderFeed { rx, cancel }
    }
}

/// Consumer side of a live order feed.
///
/// Cancelling (or dropping) stops delivery immediately; snapshots already
/// buffered are discarded.
pub struct OrderFeed {
    rx: mpsc::Receiver<Vec<Order>>,
    cancel: CancellationToken,
}

impl OrderFeed {
    /// Next snapshot, or `None` once cancelled or the feed has ended.
    pub async fn recv(&mut self) -> Option<Vec<Order>> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            snapshot = self.rx.recv() => snapshot,
        }
    }

    /// Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for OrderFeed {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct FeedTask {
    store: Arc<dyn Store>,
    hub: OrderHub,
    tenant_id: String,
    status: Option<OrderStatus>,
    changes: broadcast::Receiver<OrderChange>,
    tx: mpsc::Sender<Vec<Order>>,
    cancel: CancellationToken,
}

async fn run_feed(mut task: FeedTask) {
    tracing::debug!(tenant_id = %task.tenant_id, "Order feed started");

    loop {
        let read_failed = match task.store.list_orders(&task.tenant_id, task.status).await {
            Ok(orders) => {
                tokio::select! {
                    biased;
                    _ = task.cancel.cancelled() => break,
                    sent = task.tx.send(orders) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
                false
            }
            Err(e) => {
                tracing::warn!(tenant_id = %task.tenant_id, error = %e, "Order feed read failed");
                true
            }
        };

        let retry = async {
            if read_failed {
                tokio::time::sleep(FEED_RETRY_DELAY).await;
            } else {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            biased;
            _ = task.cancel.cancelled() => break,
            _ = task.tx.closed() => break,
            _ = retry => {}
            event = task.changes.recv() => match event {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => drain(&mut task.changes),
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    let FeedTask {
        hub,
        tenant_id,
        changes,
        ..
    } = task;
    drop(changes);
    hub.release(&tenant_id);
    tracing::debug!(tenant_id = %tenant_id, "Order feed stopped");
}

/// Swallow queued notifications; one re-read covers them all.
fn drain(changes: &mut broadcast::Receiver<OrderChange>) {
    loop {
        match changes.try_recv() {
            Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use rust_decimal::Decimal;
    use shared::models::MenuItem;
    use shared::order::LineItemRequest;

    fn line(id: i64, name: &str, cents: i64, quantity: u32) -> LineItem {
        LineItem {
            menu_item_id: id,
            name: name.into(),
            price: Decimal::new(cents, 2),
            quantity,
        }
    }

    fn setup() -> (OrderService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (OrderService::new(store.clone(), OrderHub::new()), store)
    }

    async fn seed_item(store: &MemoryStore, tenant: &str, id: i64, available: bool) {
        store
            .insert_menu_item(&MenuItem {
                id,
                restaurant_id: tenant.into(),
                name: "Margherita".into(),
                description: None,
                price: Decimal::new(1099, 2),
                category: "Pizza".into(),
                image_url: None,
                available,
                is_vegetarian: true,
                created_at: 1,
                updated_at: 1,
            })
            .await
            .unwrap();
    }

    fn code(e: OrderError) -> ErrorCode {
        AppError::from(e).code
    }

    #[tokio::test]
    async fn create_computes_exact_total() {
        let (svc, _) = setup();
        let order = svc
            .create(
                "acme",
                "5",
                vec![line(1, "Margherita", 1099, 2), line(2, "Coke", 299, 3)],
            )
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, Decimal::new(3095, 2));
    }

    #[tokio::test]
    async fn empty_order_is_rejected() {
        let (svc, store) = setup();
        let err = svc.create("acme", "5", vec![]).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::OrderEmpty);
        assert!(store.list_orders("acme", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_table_is_rejected() {
        let (svc, _) = setup();
        for table in ["", "   ", "a/b", &"9".repeat(MAX_TABLE_LEN + 1)] {
            let err = svc
                .create("acme", table, vec![line(1, "Coke", 299, 1)])
                .await
                .unwrap_err();
            assert_eq!(code(err), ErrorCode::InvalidTableId, "{table:?}");
        }
    }

    #[tokio::test]
    async fn full_forward_lifecycle() {
        let (svc, _) = setup();
        let order = svc
            .create("acme", "5", vec![line(1, "Coke", 299, 1)])
            .await
            .unwrap();
        for status in [
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Completed,
        ] {
            let updated = svc.transition("acme", order.id, status).await.unwrap();
            assert_eq!(updated.status, status);
            assert!(updated.updated_at >= order.updated_at);
        }
        svc.delete("acme", order.id).await.unwrap();
        assert_eq!(
            code(svc.get("acme", order.id).await.unwrap_err()),
            ErrorCode::OrderNotFound
        );
    }

    #[tokio::test]
    async fn rejected_transition_leaves_status_unchanged() {
        let (svc, _) = setup();
        let order = svc
            .create("acme", "5", vec![line(1, "Coke", 299, 1)])
            .await
            .unwrap();

        for target in [OrderStatus::Ready, OrderStatus::Completed, OrderStatus::Pending] {
            let err = svc.transition("acme", order.id, target).await.unwrap_err();
            assert_eq!(code(err), ErrorCode::InvalidStatusTransition);
        }
        // cancelling needs a reason
        let err = svc
            .transition("acme", order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::DeclineReasonRequired);

        let stored = svc.get("acme", order.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn terminal_orders_reject_transitions_and_allow_delete() {
        let (svc, _) = setup();
        let order = svc
            .create("acme", "5", vec![line(1, "Coke", 299, 1)])
            .await
            .unwrap();
        svc.decline("acme", order.id, "Out of stock").await.unwrap();

        for target in OrderStatus::ALL {
            let err = svc.transition("acme", order.id, target).await.unwrap_err();
            assert_eq!(code(err), ErrorCode::OrderTerminal);
        }
        svc.delete("acme", order.id).await.unwrap();
    }

    #[tokio::test]
    async fn open_orders_cannot_be_deleted() {
        let (svc, _) = setup();
        let order = svc
            .create("acme", "5", vec![line(1, "Coke", 299, 1)])
            .await
            .unwrap();
        svc.transition("acme", order.id, OrderStatus::Preparing)
            .await
            .unwrap();

        let err = svc.delete("acme", order.id).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::OrderNotTerminal);
        assert!(svc.get("acme", order.id).await.is_ok());
    }

    #[tokio::test]
    async fn decline_requires_reason() {
        let (svc, _) = setup();
        let order = svc
            .create("acme", "5", vec![line(1, "Coke", 299, 1)])
            .await
            .unwrap();

        for reason in ["", "   \t"] {
            let err = svc.decline("acme", order.id, reason).await.unwrap_err();
            assert_eq!(code(err), ErrorCode::DeclineReasonRequired);
        }

        let declined = svc.decline("acme", order.id, "Out of stock").await.unwrap();
        assert_eq!(declined.status, OrderStatus::Cancelled);
        assert_eq!(declined.decline_reason.as_deref(), Some("Out of stock"));
    }

    #[tokio::test]
    async fn decline_after_preparing_is_rejected() {
        let (svc, _) = setup();
        let order = svc
            .create("acme", "5", vec![line(1, "Coke", 299, 1)])
            .await
            .unwrap();
        svc.transition("acme", order.id, OrderStatus::Preparing)
            .await
            .unwrap();
        let err = svc
            .decline("acme", order.id, "Customer left")
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::InvalidStatusTransition);
    }

    #[tokio::test]
    async fn place_order_snapshots_menu_items() {
        let (svc, store) = setup();
        seed_item(&store, "acme", 10, true).await;

        let order = svc
            .place_order(
                "acme",
                "5",
                PlaceOrderRequest {
                    items: vec![LineItemRequest {
                        menu_item_id: 10,
                        quantity: 2,
                    }],
                },
            )
            .await
            .unwrap();
        assert_eq!(order.total, Decimal::new(2198, 2));

        // later price change does not touch the stored order
        let mut item = store.find_menu_item("acme", 10).await.unwrap().unwrap();
        item.price = Decimal::new(1299, 2);
        store.update_menu_item(&item).await.unwrap();

        let stored = svc.get("acme", order.id).await.unwrap();
        assert_eq!(stored.items[0].price, Decimal::new(1099, 2));
        assert_eq!(stored.total, Decimal::new(2198, 2));
    }

    #[tokio::test]
    async fn place_order_rejects_foreign_and_unavailable_items() {
        let (svc, store) = setup();
        seed_item(&store, "other", 10, true).await;
        seed_item(&store, "acme", 11, false).await;

        let request = |id| PlaceOrderRequest {
            items: vec![LineItemRequest {
                menu_item_id: id,
                quantity: 1,
            }],
        };
        let err = svc.place_order("acme", "5", request(10)).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::MenuItemNotFound);
        let err = svc.place_order("acme", "5", request(11)).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::MenuItemUnavailable);
        let err = svc
            .place_order("acme", "5", PlaceOrderRequest { items: vec![] })
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::OrderEmpty);
    }

    #[tokio::test]
    async fn concurrent_writer_yields_conflict() {
        let (svc, store) = setup();
        let order = svc
            .create("acme", "5", vec![line(1, "Coke", 299, 1)])
            .await
            .unwrap();

        // another writer moves the order after we read it
        let mut stale = order.clone();
        let mut winner = order.clone();
        winner.transition(OrderStatus::Preparing, 2).unwrap();
        store
            .update_order_if_status(&winner, OrderStatus::Pending)
            .await
            .unwrap();

        let from = stale.transition(OrderStatus::Preparing, 3).unwrap();
        let err = svc.commit_status(&stale, from).await.unwrap_err();
        assert!(matches!(err, OrderError::Conflict));
        assert_eq!(code(err), ErrorCode::OrderConflict);
    }

    #[tokio::test]
    async fn orders_are_tenant_isolated() {
        let (svc, _) = setup();
        let order = svc
            .create("acme", "5", vec![line(1, "Coke", 299, 1)])
            .await
            .unwrap();
        let err = svc
            .transition("other", order.id, OrderStatus::Preparing)
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::OrderNotFound);
        assert!(svc.list("other", None).await.unwrap().is_empty());
    }

    async fn next(feed: &mut OrderFeed) -> Vec<Order> {
        tokio::time::timeout(Duration::from_secs(2), feed.recv())
            .await
            .expect("feed delivery timed out")
            .expect("feed ended")
    }

    #[tokio::test]
    async fn feed_delivers_full_snapshots_newest_first() {
        let (svc, _) = setup();
        let first = svc
            .create("acme", "1", vec![line(1, "Coke", 299, 1)])
            .await
            .unwrap();

        let mut feed = svc.subscribe("acme", None);
        assert_eq!(next(&mut feed).await.len(), 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        let second = svc
            .create("acme", "2", vec![line(1, "Coke", 299, 1)])
            .await
            .unwrap();
        let snapshot = next(&mut feed).await;
        let ids: Vec<i64> = snapshot.iter().map(|o| o.id).collect();
        assert_eq!(ids, [second.id, first.id]);

        svc.transition("acme", first.id, OrderStatus::Preparing)
            .await
            .unwrap();
        let snapshot = next(&mut feed).await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn feed_ignores_other_tenants_and_honours_filter() {
        let (svc, _) = setup();
        let mut feed = svc.subscribe("acme", Some(OrderStatus::Pending));
        assert!(next(&mut feed).await.is_empty());

        svc.create("other", "1", vec![line(1, "Coke", 299, 1)])
            .await
            .unwrap();
        let order = svc
            .create("acme", "1", vec![line(1, "Coke", 299, 1)])
            .await
            .unwrap();
        let snapshot = next(&mut feed).await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, order.id);

        svc.transition("acme", order.id, OrderStatus::Preparing)
            .await
            .unwrap();
        assert!(next(&mut feed).await.is_empty());
    }

    #[tokio::test]
    async fn cancelled_feed_stops_and_releases_hub() {
        let (svc, _) = setup();
        let mut feed = svc.subscribe("acme", None);
        next(&mut feed).await;
        assert_eq!(svc.hub().subscriber_count("acme"), 1);

        feed.cancel();
        feed.cancel();
        assert!(feed.is_cancelled());

        svc.create("acme", "1", vec![line(1, "Coke", 299, 1)])
            .await
            .unwrap();
        assert!(feed.recv().await.is_none());

        // the feed task notices the cancellation and lets go of the hub
        for _ in 0..100 {
            if svc.hub().tenant_count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(svc.hub().tenant_count(), 0);
    }

    #[tokio::test]
    async fn dropped_feed_releases_hub() {
        let (svc, _) = setup();
        let feed = svc.subscribe("acme", None);
        drop(feed);
        for _ in 0..100 {
            if svc.hub().tenant_count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(svc.hub().tenant_count(), 0);
    }
}
