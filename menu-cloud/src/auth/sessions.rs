//! Revoked session tokens
//!
//! Tokens are stateless; sign-out records the token id until its natural
//! expiry so the middleware can reject it.

use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct SessionRevocations {
    /// jti -> exp (Unix seconds)
    revoked: Arc<DashMap<String, usize>>,
}

impl SessionRevocations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke(&self, jti: &str, exp: usize) {
        self.revoked.insert(jti.to_string(), exp);
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.contains_key(jti)
    }

    /// Forget tokens that have expired anyway. Returns how many were dropped.
    pub fn cleanup(&self, now_secs: usize) -> usize {
        let before = self.revoked.len();
        self.revoked.retain(|_, exp| *exp > now_secs);
        before - self.revoked.len()
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}
