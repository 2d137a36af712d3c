//! Cached config-blob store.
//!
//! Holds the large, rarely-changing config artifacts (asset digest, item
//! templates) keyed by a fixed name per artifact type, each stamped with the
//! time it was fetched. Freshness is decided by comparing that stored fetch
//! time against the remote config's reported timestamp, never the local
//! clock.

use bytes::Bytes;
use dashmap::DashMap;

/// Fixed cache key for the asset digest artifact.
pub const KEY_ASSET_DIGEST: &str = "asset_digest";
/// Fixed cache key for the item templates artifact.
pub const KEY_ITEM_TEMPLATES: &str = "item_templates";

/// A cached artifact plus the unix-ms time it was fetched.
#[derive(Debug, Clone)]
pub struct CachedBlob {
    pub data: Bytes,
    pub fetched_ms: i64,
}

impl CachedBlob {
    /// Whether this blob is still usable against a remote-reported
    /// freshness timestamp.
    pub fn is_fresh(&self, remote_timestamp_ms: i64) -> bool {
        self.fetched_ms >= remote_timestamp_ms
    }
}

/// Cache store seam.
pub trait CacheStore: Send + Sync {
    fn load(&self, key: &str) -> Option<CachedBlob>;
    fn store(&self, key: &str, blob: CachedBlob);
}

/// In-memory cache store.
#[derive(Default)]
pub struct InMemoryCacheStore {
    blobs: DashMap<String, CachedBlob>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for InMemoryCacheStore {
    fn load(&self, key: &str) -> Option<CachedBlob> {
        self.blobs.get(key).map(|e| e.value().clone())
    }

    fn store(&self, key: &str, blob: CachedBlob) {
        self.blobs.insert(key.to_string(), blob);
    }
}
