//! Dashboard summary statistics

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Four derived numbers for one restaurant, recomputed from its orders.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    /// Distinct tables with at least one open order
    pub active_tables: u32,
    /// Orders created since local midnight
    pub todays_orders: u32,
    /// Σ total of today's orders that were not cancelled
    pub todays_revenue: Decimal,
    /// Orders in pending, preparing or ready
    pub pending_orders: u32,
}

/// Stats plus the staleness bound callers should assume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    #[serde(flatten)]
    pub stats: DashboardStats,
    /// Millis since epoch when `stats` was computed
    pub computed_at: i64,
    /// Values may be up to this many seconds old
    pub refresh_interval_secs: u64,
}
