//! Live dashboard WebSocket protocol
//!
//! Server → dashboard: [`FeedMessage`] (full order snapshots and stats)
//! Dashboard → server: [`FeedCommand`] (filter control)

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::models::DashboardSnapshot;
use crate::order::{Order, OrderStatus};

/// Server → dashboard push
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeedMessage {
    /// Handshake complete: current order set and stats
    Ready {
        orders: Vec<Order>,
        stats: DashboardSnapshot,
    },

    /// The full current order set, newest first. Replaces whatever the
    /// dashboard held before.
    Orders { orders: Vec<Order> },

    /// Periodic stats refresh
    Stats { stats: DashboardSnapshot },

    /// A command could not be applied
    Error { code: ErrorCode, message: String },
}

/// Dashboard → server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeedCommand {
    /// Restrict the feed to one status (`None` = all orders)
    SetFilter {
        #[serde(default)]
        status: Option<OrderStatus>,
    },

    /// Recompute stats now instead of waiting for the next interval
    RefreshStats,
}
