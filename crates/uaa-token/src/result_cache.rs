//! Cache of successful `/check_token` results keyed by raw token
//!
//! Each entry carries its own TTL, set by the caller that stored it. The TTL only
//! bounds how long the entry is retained; whether a retained result is still valid
//! is decided separately from its `exp` claim by the remote verifier.

use crate::claims::Claims;
use moka::Expiry;
use moka::future::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Upper bound on retained introspection results
const DEFAULT_MAX_ENTRIES: u64 = 10_000;

#[derive(Debug, Clone)]
struct CachedResult {
    claims: Arc<Claims>,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with; overwrites restart it
struct PerEntryTtl;

impl Expiry<String, CachedResult> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedResult,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedResult,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Lookup and write counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultCacheStats {
    /// Calls to [`ResultCache::get`]
    pub lookups: u64,
    /// Lookups that found an entry
    pub hits: u64,
    /// Calls to [`ResultCache::insert`] that stored an entry
    pub writes: u64,
}

#[derive(Debug, Default)]
struct Counters {
    lookups: AtomicU64,
    hits: AtomicU64,
    writes: AtomicU64,
}

/// Raw token → last successful introspection result
#[derive(Clone)]
pub struct ResultCache {
    entries: Cache<String, CachedResult>,
    counters: Arc<Counters>,
}

// Keys are bearer tokens; never print them
impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.entries.entry_count())
            .field("stats", &self.stats())
            .finish()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    /// Create a cache holding up to 10 000 results
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// Create a cache holding up to `max_entries` results
    pub fn with_capacity(max_entries: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_entries)
                .expire_after(PerEntryTtl)
                .build(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Retained result for `token`, whatever its `exp`
    pub async fn get(&self, token: &str) -> Option<Claims> {
        self.counters.lookups.fetch_add(1, Ordering::Relaxed);
        let found = self.entries.get(token).await?;
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        Some(Claims::clone(&found.claims))
    }

    /// Store or overwrite the result for `token`, retained for `ttl`
    ///
    /// A zero `ttl` stores nothing.
    pub async fn insert(&self, token: impl Into<String>, claims: Claims, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        self.counters.writes.fetch_add(1, Ordering::Relaxed);
        self.entries
            .insert(
                token.into(),
                CachedResult {
                    claims: Arc::new(claims),
                    ttl,
                },
            )
            .await;
    }

    /// Drop every retained result
    pub fn flush_all(&self) {
        debug!("Flushing remote result cache");
        self.entries.invalidate_all();
    }

    /// Counters since creation
    pub fn stats(&self) -> ResultCacheStats {
        ResultCacheStats {
            lookups: self.counters.lookups.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
        }
    }
}
