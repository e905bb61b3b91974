//! Data models
//!
//! Every record carries its owning restaurant id; nothing is shared
//! across tenants.

pub mod dashboard;
pub mod menu;
pub mod restaurant;
pub mod user;

pub use dashboard::{DashboardSnapshot, DashboardStats};
pub use menu::{MenuCategory, MenuItem, MenuItemCreate, MenuItemUpdate, group_by_category};
pub use restaurant::{
    Address, Restaurant, RestaurantProfile, RestaurantSettings, RestaurantUpdate, SettingsUpdate,
    SocialMedia,
};
pub use user::UserRecord;
