//! Owner authentication: session tokens, revocation, rate limits

pub mod rate_limit;
pub mod sessions;
pub mod tenant_auth;

pub use rate_limit::RateLimiter;
pub use sessions::SessionRevocations;
pub use tenant_auth::TenantIdentity;
