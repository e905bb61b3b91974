//! Shared types for the menu platform
//!
//! Domain types used by the server and any client: the error system,
//! data models, the order lifecycle rules, validation and the live
//! dashboard protocol.

pub mod console;
pub mod error;
pub mod models;
pub mod order;
pub mod util;
pub mod validation;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use order::{LineItem, Order, OrderStatus};
