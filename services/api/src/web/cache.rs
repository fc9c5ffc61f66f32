//! services/api/src/web/cache.rs
//!
//! A fixed-TTL read cache for dashboard fetches. One slot per table; each
//! page load either reuses the cached row vector or refetches and replaces
//! it. There is no keyed invalidation beyond `invalidate`, which the insert
//! handlers call so a fresh row shows up on the next render.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// A single-slot cache holding one fetched row vector for `ttl`.
pub struct ReadCache<T> {
    ttl: Duration,
    slot: RwLock<Option<(Instant, Arc<Vec<T>>)>>,
}

impl<T> ReadCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Returns the cached rows if they are younger than the TTL.
    pub async fn get(&self) -> Option<Arc<Vec<T>>> {
        let slot = self.slot.read().await;
        match &*slot {
            Some((stored_at, rows)) if stored_at.elapsed() < self.ttl => Some(rows.clone()),
            _ => None,
        }
    }

    /// Stores freshly fetched rows and returns them shared.
    pub async fn put(&self, rows: Vec<T>) -> Arc<Vec<T>> {
        let rows = Arc::new(rows);
        *self.slot.write().await = Some((Instant::now(), rows.clone()));
        rows
    }

    /// Drops the cached rows so the next read refetches.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_rows_within_ttl() {
        let cache = ReadCache::new(Duration::from_secs(60));
        assert!(cache.get().await.is_none());
        cache.put(vec![1, 2, 3]).await;
        assert_eq!(cache.get().await.unwrap().as_slice(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn expires_after_ttl() {
        let cache = ReadCache::new(Duration::from_millis(5));
        cache.put(vec![1]).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn invalidate_clears_the_slot() {
        let cache = ReadCache::new(Duration::from_secs(60));
        cache.put(vec![1]).await;
        cache.invalidate().await;
        assert!(cache.get().await.is_none());
    }
}
