//! Service layer: business rules over the store, identity and blob backends

pub mod auth;
pub mod dashboard;
pub mod images;
pub mod menu;
pub mod orders;
pub mod tenants;

pub use auth::{AuthService, AuthSession};
pub use dashboard::DashboardService;
pub use images::ImageService;
pub use menu::MenuService;
pub use orders::{OrderError, OrderFeed, OrderService};
pub use tenants::TenantService;
