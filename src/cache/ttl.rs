//! In-memory key→value cache with per-entry expiration.
//!
//! Shared by every request handler in the process. Expiration is lazy: an
//! expired entry is removed the first time a reader observes it; there is no
//! background sweeper. The key space is bounded by the domain (one entry per
//! Pokémon identifier or search query), so no size cap is enforced.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;

/// A stored value and its absolute expiry.
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Thread-safe TTL cache.
///
/// A single coarse mutex guards the map; `get`/`set` hold it only for the
/// duration of a map lookup or insert and never across network calls, so
/// contention is a throughput bound, not a correctness concern.
#[derive(Default)]
pub struct TtlCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`. Returns `None` on absence or expiry.
    ///
    /// An entry is visible only while the current time is strictly before
    /// its expiry. An expired entry is evicted on observation, so later
    /// lookups stay absent until the key is repopulated.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `value` under `key`, unconditionally replacing any previous
    /// entry. Expiry is `now + ttl`.
    pub fn set(&self, key: &str, value: Value, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .insert(key.to_string(), entry);
    }

    /// Number of live-or-expired entries currently held (expired entries
    /// linger until observed).
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    /// True when no entries are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
