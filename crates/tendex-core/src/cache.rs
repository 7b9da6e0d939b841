//! Content-addressed cache for full extraction results.
//!
//! Keys hash the document content, not its path, so a renamed file still
//! hits and a modified file misses. Entries expire after a TTL and the
//! oldest entry is evicted when the cache is full.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::pipeline::ExtractionOutcome;

/// Bytes hashed from the head of the document. Hashing the whole content of
/// large files buys nothing once the length is mixed in.
const HASH_PREFIX_LEN: usize = 4096;

/// Content hash of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Key from raw document bytes: SHA-256 over the first 4 KiB plus the
    /// total length.
    pub fn from_bytes(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(&content[..content.len().min(HASH_PREFIX_LEN)]);
        hasher.update((content.len() as u64).to_le_bytes());
        CacheKey(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

struct Entry {
    outcome: ExtractionOutcome,
    inserted_at: Instant,
}

struct Inner {
    entries: HashMap<CacheKey, Entry>,
    stats: CacheStats,
}

/// Bounded TTL cache, safe to share between threads.
pub struct ExtractionCache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
}

impl ExtractionCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        ExtractionCache {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
            }),
            capacity,
            ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<ExtractionOutcome> {
        let mut inner = self.lock();
        let fresh = inner
            .entries
            .get(key)
            .map(|e| e.inserted_at.elapsed() < self.ttl);
        match fresh {
            Some(true) => {
                inner.stats.hits += 1;
                debug!(key = %key.to_hex(), "cache hit");
                inner.entries.get(key).map(|e| e.outcome.clone())
            }
            Some(false) => {
                inner.entries.remove(key);
                inner.stats.expirations += 1;
                inner.stats.misses += 1;
                None
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    pub fn put(&self, key: CacheKey, outcome: ExtractionOutcome) {
        let mut inner = self.lock();
        if inner.entries.len() >= self.capacity && !inner.entries.contains_key(&key) {
            // evict the oldest entry
            if let Some(oldest) = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone())
            {
                inner.entries.remove(&oldest);
                inner.stats.evictions += 1;
            }
        }
        inner.entries.insert(
            key,
            Entry {
                outcome,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }
}
