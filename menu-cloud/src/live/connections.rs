//! Per-tenant live connection accounting

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Default)]
pub struct LiveConnections {
    counts: Arc<DashMap<String, AtomicUsize>>,
}

impl LiveConnections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a slot for `tenant_id`, or `None` when `max` are already open.
    /// The slot is released when the guard drops.
    pub fn try_acquire(&self, tenant_id: &str, max: usize) -> Option<ConnectionGuard> {
        let counter = self
            .counts
            .entry(tenant_id.to_string())
            .or_insert_with(|| AtomicUsize::new(0));
        let prev = counter.fetch_add(1, Ordering::SeqCst);
        if prev >= max {
            counter.fetch_sub(1, Ordering::SeqCst);
            return None;
        }
        drop(counter);
        Some(ConnectionGuard {
            counts: self.counts.clone(),
            tenant_id: tenant_id.to_string(),
        })
    }

    pub fn count(&self, tenant_id: &str) -> usize {
        self.counts
            .get(tenant_id)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

pub struct ConnectionGuard {
    counts: Arc<DashMap<String, AtomicUsize>>,
    tenant_id: String,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if let Some(counter) = self.counts.get(&self.tenant_id) {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
        self.counts
            .remove_if(&self.tenant_id, |_, c| c.load(Ordering::SeqCst) == 0);
    }
}
