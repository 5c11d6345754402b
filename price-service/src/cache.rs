use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::models::{ListingId, PricePayload};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage for successfully extracted listing prices.
///
/// Expiry is decided against the `now` passed by the caller, so entries are
/// never evicted, only ignored once stale.
#[async_trait]
pub trait PriceCache: Send + Sync {
    async fn get_fresh(&self, listing: ListingId, now: DateTime<Utc>) -> Option<PricePayload>;

    async fn set(&self, listing: ListingId, created_at: DateTime<Utc>, payload: PricePayload);
}

struct CacheEntry {
    payload: PricePayload,
    created_at: DateTime<Utc>,
}

pub struct MemoryPriceCache {
    cache: Arc<RwLock<HashMap<ListingId, CacheEntry>>>,
    ttl: Duration,
}

impl MemoryPriceCache {
    pub fn with_ttl(ttl_seconds: u64) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl: i64::try_from(ttl_seconds)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
        }
    }
}

#[async_trait]
impl PriceCache for MemoryPriceCache {
    async fn get_fresh(&self, listing: ListingId, now: DateTime<Utc>) -> Option<PricePayload> {
        let cache = self.cache.read().await;
        if let Some(entry) = cache.get(&listing)
            && now - entry.created_at < self.ttl
        {
            return Some(entry.payload.clone());
        }
        None
    }

    async fn set(&self, listing: ListingId, created_at: DateTime<Utc>, payload: PricePayload) {
        let mut cache = self.cache.write().await;
        cache.insert(
            listing,
            CacheEntry {
                payload,
                created_at,
            },
        );
    }
}
