//! Orders: data model and the pure lifecycle rules
//!
//! Persistence and fan-out live in the server; everything here is
//! side-effect free so it can be checked without a store.

pub mod money;
mod status;

pub use status::{OrderStatus, TransitionError, UnknownStatus};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Snapshot of a menu item at order time. Later menu edits never touch it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub menu_item_id: i64,
    pub name: String,
    /// Unit price when the order was placed
    pub price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub restaurant_id: String,
    pub table_number: String,
    pub items: Vec<LineItem>,
    /// Σ price × quantity, fixed at creation
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Diner request line: which item and how many. Name and price are looked
/// up server-side and never trusted from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemRequest {
    pub menu_item_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclineRequest {
    pub reason: String,
}

/// Lifecycle rule violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderRuleError {
    #[error("order must contain at least one item")]
    Empty,

    #[error("quantity for item {menu_item_id} must be between 1 and {max}")]
    InvalidQuantity { menu_item_id: i64, max: u32 },

    #[error("table number is required")]
    MissingTable,

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("a decline reason is required")]
    DeclineReasonRequired,

    #[error("order is {0}; only completed or cancelled orders can be deleted")]
    NotTerminal(OrderStatus),
}

impl Order {
    /// Build a new pending order. Rejects an empty line list.
    pub fn new(
        id: i64,
        restaurant_id: impl Into<String>,
        table_number: impl Into<String>,
        items: Vec<LineItem>,
        now: i64,
    ) -> Result<Self, OrderRuleError> {
        let table_number = table_number.into().trim().to_string();
        if table_number.is_empty() {
            return Err(OrderRuleError::MissingTable);
        }
        if items.is_empty() {
            return Err(OrderRuleError::Empty);
        }
        if let Some(bad) = items
            .iter()
            .find(|i| i.quantity == 0 || i.quantity > money::MAX_QUANTITY)
        {
            return Err(OrderRuleError::InvalidQuantity {
                menu_item_id: bad.menu_item_id,
                max: money::MAX_QUANTITY,
            });
        }

        Ok(Self {
            id,
            restaurant_id: restaurant_id.into(),
            table_number,
            total: money::order_total(&items),
            items,
            status: OrderStatus::Pending,
            decline_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Move to `target`. Returns the status the change was validated against.
    pub fn transition(
        &mut self,
        target: OrderStatus,
        now: i64,
    ) -> Result<OrderStatus, OrderRuleError> {
        let from = self.status;
        from.check_transition(target)?;
        self.status = target;
        self.updated_at = now;
        Ok(from)
    }

    /// pending → cancelled with a non-blank reason
    pub fn decline(&mut self, reason: &str, now: i64) -> Result<OrderStatus, OrderRuleError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(OrderRuleError::DeclineReasonRequired);
        }
        let from = self.transition(OrderStatus::Cancelled, now)?;
        self.decline_reason = Some(reason.to_string());
        Ok(from)
    }

    pub fn ensure_deletable(&self) -> Result<(), OrderRuleError> {
        if self.status.is_terminal() {
            Ok(())
        } else {
            Err(OrderRuleError::NotTerminal(self.status))
        }
    }
}
