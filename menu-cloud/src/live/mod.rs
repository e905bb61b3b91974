//! OrderHub: per-tenant order change fan-out
//!
//! Services publish after every successful order write; feed tasks
//! subscribe and re-read the tenant's order set on each notification.
//!
//! ```text
//! OrderService (create / transition / decline / delete)
//!       │ OrderChange
//!       ▼
//! OrderHub
//!   └── tenants: tenant_id → broadcast::Sender<OrderChange>
//!         │
//!         ▼
//!   feed tasks (subscribe → re-query → full snapshot)
//! ```
//!
//! Events only say *that* something changed. Consumers never apply them
//! as diffs; they reload from the store, which stays authoritative.
//! The hub is in-process, so every instance only sees its own writes.

pub mod connections;

pub use connections::{ConnectionGuard, LiveConnections};

use dashmap::DashMap;
use shared::order::OrderStatus;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderChange {
    Created { order_id: i64 },
    StatusChanged { order_id: i64, status: OrderStatus },
    Deleted { order_id: i64 },
}

impl OrderChange {
    pub fn order_id(&self) -> i64 {
        match self {
            OrderChange::Created { order_id }
            | OrderChange::StatusChanged { order_id, .. }
            | OrderChange::Deleted { order_id } => *order_id,
        }
    }
}

/// Enough to absorb a burst of writes between two re-queries
const BROADCAST_CAPACITY: usize = 256;

#[derive(Clone, Default)]
pub struct OrderHub {
    tenants: Arc<DashMap<String, broadcast::Sender<OrderChange>>>,
}

impl OrderHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify every subscriber of `tenant_id`. No-op without subscribers.
    pub fn publish(&self, tenant_id: &str, change: OrderChange) {
        if let Some(tx) = self.tenants.get(tenant_id) {
            // Err only means nobody is listening right now
            let _ = tx.send(change);
        }
    }

    pub fn subscribe(&self, tenant_id: &str) -> broadcast::Receiver<OrderChange> {
        self.tenants
            .entry(tenant_id.to_string())
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Drop the tenant's channel once its last receiver is gone.
    ///
    /// Called by feed tasks after dropping their receiver.
    pub fn release(&self, tenant_id: &str) {
        self.tenants
            .remove_if(tenant_id, |_, tx| tx.receiver_count() == 0);
    }

    /// Remove every tenant entry with no receivers (periodic sweep).
    pub fn cleanup(&self) -> usize {
        let before = self.tenants.len();
        self.tenants.retain(|_, tx| tx.receiver_count() > 0);
        before - self.tenants.len()
    }

    pub fn subscriber_count(&self, tenant_id: &str) -> usize {
        self.tenants
            .get(tenant_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    pub fn tenant_count(&self) -> usize {
        self.tenants.len()
    }
}
