//! Lookup caches for geocodes, road distances and travel times.
//!
//! Entries are never evicted automatically; only an explicit `clear` drops
//! them. Storage sits behind [`CacheStore`] so a service can be handed a
//! different backing store than the in-memory default.

use std::collections::HashMap;

use parking_lot::RwLock;

/// String-keyed storage for one kind of cached value.
///
/// Implementations must tolerate concurrent readers and writers; a write
/// racing another write on the same key may keep either value.
pub trait CacheStore<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;

    fn insert(&self, key: String, value: V);

    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unbounded in-memory cache.
#[derive(Debug)]
pub struct MemoryCache<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> CacheStore<V> for MemoryCache<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    fn insert(&self, key: String, value: V) {
        self.entries.write().insert(key, value);
    }

    fn clear(&self) {
        self.entries.write().clear();
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}
