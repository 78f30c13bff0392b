//! Signing key resolution and caching
//!
//! Keys are cached per key-endpoint URL for the life of the cache. There is no TTL
//! and no refresh: a rotated key is picked up only after [`KeyCache::clear`].
//! Concurrent misses for the same URL may each fetch; the last write wins.

use crate::error::{KeyFetchError, Result, TokenError};
use crate::jwt::SigningKey;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Key endpoint URL → signing key
#[derive(Debug, Clone, Default)]
pub struct KeyCache {
    keys: Arc<DashMap<String, SigningKey>>,
}

impl KeyCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached key for `url`
    pub fn get(&self, url: &str) -> Option<SigningKey> {
        self.keys.get(url).map(|entry| entry.value().clone())
    }

    /// Store the key fetched from `url`
    pub fn insert(&self, url: impl Into<String>, key: SigningKey) {
        self.keys.insert(url.into(), key);
    }

    /// Drop every cached key
    pub fn clear(&self) {
        debug!(cached = self.keys.len(), "Clearing key cache");
        self.keys.clear();
    }

    /// Number of cached keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether a key for `url` is cached
    pub fn contains(&self, url: &str) -> bool {
        self.keys.contains_key(url)
    }
}

/// `/token_key` response body
#[derive(Debug, Deserialize)]
struct TokenKeyResponse {
    value: String,
}

/// Fetches signing keys over HTTP, backed by a [`KeyCache`]
#[derive(Debug, Clone)]
pub struct KeyResolver {
    http_client: reqwest::Client,
    cache: KeyCache,
}

impl KeyResolver {
    /// Create a resolver with its own empty cache
    pub fn new(http_client: reqwest::Client) -> Self {
        Self::with_cache(http_client, KeyCache::new())
    }

    /// Create a resolver over an existing cache
    pub fn with_cache(http_client: reqwest::Client, cache: KeyCache) -> Self {
        Self { http_client, cache }
    }

    /// The backing cache
    pub fn cache(&self) -> &KeyCache {
        &self.cache
    }

    /// Key published at `url`, fetched on first use
    ///
    /// # Errors
    ///
    /// [`TokenError::KeyFetch`] when the request fails, the endpoint answers with a
    /// non-success status, or the body has no `value`. Failures are not cached.
    pub async fn resolve_key(&self, url: &str) -> Result<SigningKey> {
        if let Some(key) = self.cache.get(url) {
            debug!(key_url = %url, "Using cached signing key");
            return Ok(key);
        }

        let key = self.fetch(url).await.map_err(|source| {
            warn!(key_url = %url, error = %source, "Error reading token key");
            TokenError::KeyFetch {
                url: url.to_string(),
                source,
            }
        })?;

        self.cache.insert(url, key.clone());
        Ok(key)
    }

    async fn fetch(&self, url: &str) -> std::result::Result<SigningKey, KeyFetchError> {
        info!(key_url = %url, "Fetching signing key");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(KeyFetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeyFetchError::Status(status));
        }

        let body: TokenKeyResponse = response
            .json()
            .await
            .map_err(|e| KeyFetchError::InvalidResponse(e.to_string()))?;

        debug!(key_url = %url, "Fetched signing key");
        Ok(SigningKey::new(body.value))
    }
}
