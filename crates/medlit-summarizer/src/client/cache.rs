//! Search result cache.
//!
//! Keys are SHA-256 digests of (query, count, credential), so two callers with
//! different API keys never see each other's results.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use moka::policy::EvictionPolicy;
use sha2::{Digest, Sha256};

use crate::models::Paper;

/// TTL- and capacity-bounded cache of merged paper lists.
#[derive(Clone)]
pub struct ResultCache {
    inner: Cache<String, Arc<Vec<Paper>>>,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` searches for `ttl` each.
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { inner }
    }

    /// Build the cache key for a normalized query.
    ///
    /// Each string field is length-prefixed so no two distinct tuples share a
    /// digest input.
    #[must_use]
    pub fn key(query: &str, count: u32, credential: Option<&str>) -> String {
        let mut hasher = Sha256::new();
        hash_field(&mut hasher, query.as_bytes());
        hasher.update(count.to_le_bytes());
        match credential {
            Some(credential) => {
                hasher.update([1_u8]);
                hash_field(&mut hasher, credential.as_bytes());
            }
            None => hasher.update([0_u8]),
        }

        format!("{:x}", hasher.finalize())
    }

    /// Cached papers for a key, if present and not expired.
    pub async fn get(&self, key: &str) -> Option<Vec<Paper>> {
        self.inner.get(key).await.map(|papers| papers.as_ref().clone())
    }

    /// Store papers under a key.
    pub async fn insert(&self, key: String, papers: Vec<Paper>) {
        self.inner.insert(key, Arc::new(papers)).await;
    }

    /// Approximate number of live entries.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

fn hash_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache").field("entries", &self.entry_count()).finish()
    }
}
