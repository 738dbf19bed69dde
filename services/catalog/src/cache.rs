//! Response cache for catalog reads.
//!
//! # Purpose
//! Maps a request identity (path plus raw query string) to the serialized
//! response body it produced, with a per-entry expiry.
//!
//! # Key invariants
//! - An entry is never returned at or after its expiry; expired entries are
//!   evicted lazily on read.
//! - Keys are compared verbatim, so `?a=1&b=2` and `?b=2&a=1` are different
//!   entries.
//! - Every invalidation bumps a generation counter. Readers that computed a
//!   response before an invalidation cannot store it afterwards.
//! - The map never holds more than `max_entries` entries. Inserting into a
//!   full cache first drops expired entries, then the entry closest to expiry.
use bytes::Bytes;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Default lifetime of a cached read (10 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_millis(600_000);

/// Default cap on stored responses.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Cache key of the full catalog listing.
pub const LISTING_KEY: &str = "/api/cars";

/// What a successful write clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationPolicy {
    /// Drop every entry, including cached search results.
    #[default]
    All,
    /// Drop only the listing entry. Cached searches may be served stale
    /// until their TTL runs out.
    Listing,
}

impl FromStr for InvalidationPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "listing" => Ok(Self::Listing),
            other => Err(format!("unknown cache invalidation policy: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Bytes,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct ResponseCache {
    // RwLock allows concurrent lookups; expiry eviction takes the write side.
    inner: RwLock<HashMap<String, CacheEntry>>,
    generation: AtomicU64,
    ttl: Duration,
    policy: InvalidationPolicy,
    max_entries: usize,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, InvalidationPolicy::default())
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration, policy: InvalidationPolicy) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            ttl,
            policy,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Cap the number of stored responses. A cap of zero disables storage.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // Caller holds the write lock. Returns whether the entry was stored.
    fn insert_bounded(
        &self,
        entries: &mut HashMap<String, CacheEntry>,
        key: String,
        entry: CacheEntry,
    ) -> bool {
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let now = Instant::now();
            let before = entries.len();
            entries.retain(|_, existing| now < existing.expires_at);
            while !entries.is_empty() && entries.len() >= self.max_entries {
                let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, existing)| existing.expires_at)
                    .map(|(oldest, _)| oldest.clone())
                else {
                    break;
                };
                entries.remove(&oldest);
            }
            let evicted = before - entries.len();
            metrics::counter!("catalog_cache_evictions_total").increment(evicted as u64);
            tracing::debug!(evicted, "response cache at capacity");
        }
        if entries.len() < self.max_entries || entries.contains_key(&key) {
            entries.insert(key, entry);
            true
        } else {
            false
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn policy(&self) -> InvalidationPolicy {
        self.policy
    }

    /// Current invalidation generation; pass it back to [`Self::set_if_current`].
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        {
            let guard = self.inner.read().await;
            match guard.get(key) {
                None => return None,
                Some(entry) if Instant::now() < entry.expires_at => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }
        // Expired: evict, unless a fresher value landed in between.
        let mut guard = self.inner.write().await;
        if guard
            .get(key)
            .is_some_and(|entry| Instant::now() >= entry.expires_at)
        {
            guard.remove(key);
        }
        None
    }

    pub async fn set(&self, key: impl Into<String>, value: Bytes, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut guard = self.inner.write().await;
        self.insert_bounded(&mut guard, key.into(), entry);
    }

    /// Store `value` only if no invalidation happened since `generation` was read.
    ///
    /// Returns whether the value was stored.
    pub async fn set_if_current(
        &self,
        key: impl Into<String>,
        value: Bytes,
        ttl: Duration,
        generation: u64,
    ) -> bool {
        let mut guard = self.inner.write().await;
        // Invalidations bump the generation while holding the write lock.
        if self.generation.load(Ordering::Acquire) != generation {
            return false;
        }
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.insert_bounded(&mut guard, key.into(), entry)
    }

    pub async fn invalidate(&self, key: &str) {
        let mut guard = self.inner.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        guard.remove(key);
    }

    pub async fn invalidate_all(&self) {
        let mut guard = self.inner.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        guard.clear();
    }

    /// Apply the configured policy after a successful catalog write.
    pub async fn invalidate_for_write(&self) {
        match self.policy {
            InvalidationPolicy::All => self.invalidate_all().await,
            InvalidationPolicy::Listing => self.invalidate(LISTING_KEY).await,
        }
        metrics::counter!("catalog_cache_invalidations_total").increment(1);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
