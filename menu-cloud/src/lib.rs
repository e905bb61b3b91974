//! menu-cloud: multi-tenant restaurant menu and ordering service
//!
//! - Host Router: `<slug>.<root>` hosts are served from `/restaurant/<slug>`
//! - Owner API (JWT): restaurant profile, menu, orders, dashboard, tables
//! - Public storefront: menu browsing and table ordering
//! - Live dashboard feed over WebSocket

pub mod api;
pub mod auth;
pub mod blob;
pub mod config;
pub mod db;
pub mod error;
pub mod host_router;
pub mod identity;
pub mod live;
pub mod services;
pub mod state;
pub mod util;
