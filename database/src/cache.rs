use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Small LRU-ish cache: eviction picks the entry with the oldest access
/// tick. Linear scan on eviction is fine at the capacities the stores use.
pub struct LruCache<K, V> {
    capacity: usize,
    tick: AtomicU64,
    cache: RwLock<HashMap<K, CacheEntry<V>>>,
}

struct CacheEntry<V> {
    value: V,
    last_access: u64,
}

impl<K: Hash + Eq + Clone, V: Clone> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, tick: AtomicU64::new(0), cache: RwLock::new(HashMap::with_capacity(capacity)) }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let tick = self.tick.fetch_add(1, Ordering::Relaxed);
        let mut cache = self.cache.write();
        cache.get_mut(key).map(|entry| {
            entry.last_access = tick;
            entry.value.clone()
        })
    }

    pub fn insert(&self, key: K, value: V) {
        let tick = self.tick.fetch_add(1, Ordering::Relaxed);
        let mut cache = self.cache.write();
        if cache.len() >= self.capacity && !cache.contains_key(&key) {
            if let Some(oldest) = cache.iter().min_by_key(|(_, entry)| entry.last_access).map(|(k, _)| k.clone()) {
                cache.remove(&oldest);
            }
        }
        cache.insert(key, CacheEntry { value, last_access: tick });
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.cache.write().remove(key).map(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}
