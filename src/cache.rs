//! Response cache for folder and file listings.
//!
//! Listings are cached to stay under the remote service's rate limits, so a
//! listing may be up to one TTL stale. Every mutation clears the whole cache
//! because one folder-tree change can affect an unbounded number of listing
//! keys (parent listings, nested listings, the aggregate file view).
//!
//! # Example
//!
//! ```
//! use mediafold::cache::ResponseCache;
//!
//! let cache = ResponseCache::new();
//! cache.set("folders_root", &vec!["events"], None);
//! let hit: Option<Vec<String>> = cache.get("folders_root");
//! assert_eq!(hit, Some(vec!["events".to_string()]));
//! ```

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::constants::DEFAULT_CACHE_TTL;

/// Cached value with its expiry.
#[derive(Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Process-wide keyed cache with per-entry expiry.
///
/// `ResponseCache` is `Clone`; clones share the same entries, so one instance
/// is constructed at startup and handed to every handler.
#[derive(Clone)]
pub struct ResponseCache {
    data: Arc<DashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.data.len())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl ResponseCache {
    /// Creates an empty cache with the default five minute TTL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache with a custom default TTL.
    pub fn with_ttl(default_ttl: Duration) -> Self {
        Self {
            data: Arc::new(DashMap::new()),
            default_ttl,
        }
    }

    /// The TTL applied when `set` is called without one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the cached value for `key` if present and not expired.
    ///
    /// An expired entry is removed on the way out. An entry that no longer
    /// deserializes into `T` is treated as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = {
            let entry = self.data.get(key)?;
            if entry.is_expired() {
                drop(entry);
                // A concurrent `set` may have replaced the entry since the read.
                if self.data.remove_if(key, |_, e| e.is_expired()).is_some() {
                    debug!(key, "Cache entry expired");
                }
                return None;
            }
            entry.value.clone()
        };

        match serde_json::from_value(value) {
            Ok(hit) => {
                debug!(key, "Serving from cache");
                Some(hit)
            },
            Err(e) => {
                warn!(key, error = %e, "Cached value has unexpected shape");
                None
            },
        }
    }

    /// Stores `value` under `key` for `ttl` (or the default TTL).
    ///
    /// Values that fail to serialize are not cached.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        match serde_json::to_value(value) {
            Ok(value) => {
                let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));
                self.data.insert(key.to_string(), entry);
            },
            Err(e) => warn!(key, error = %e, "Response not cacheable"),
        }
    }

    /// Removes every entry.
    pub fn clear(&self) {
        debug!(entries = self.data.len(), "Clearing response cache");
        self.data.clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
