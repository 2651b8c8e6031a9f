//! Get-or-load cache keyed by name.
//!
//! Each key owns a slot with its own lock. The map lock is held only to find
//! or create a slot, so loads of distinct keys run concurrently while
//! concurrent first requests for the same key wait for a single load.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

/// Counters for one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Loads that completed successfully.
    pub loads: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

type Slot<V> = Arc<Mutex<Option<V>>>;

/// A name-keyed cache whose values are created on first access.
pub struct KeyedCache<V> {
    name: &'static str,
    slots: Mutex<HashMap<String, Slot<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
}

impl<V: Clone> KeyedCache<V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            loads: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key`, calling `load` on first access.
    ///
    /// A failed load stores nothing; the next request for the key tries again.
    pub fn get_or_try_load<E, F>(&self, key: &str, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let slot = {
            let mut slots = self.slots.lock();
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(None)))
                .clone()
        };

        let mut value = slot.lock();
        if let Some(v) = value.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(v.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(cache = self.name, key, "Cache miss");
        let loaded = load()?;
        self.loads.fetch_add(1, Ordering::Relaxed);
        *value = Some(loaded.clone());
        Ok(loaded)
    }

    /// Cached value for `key` without loading.
    pub fn get(&self, key: &str) -> Option<V> {
        let slot = self.slots.lock().get(key).cloned()?;
        let value = slot.lock().clone();
        value
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove every entry and return the loaded values.
    pub fn drain(&self) -> Vec<V> {
        let slots: Vec<Slot<V>> = self.slots.lock().drain().map(|(_, slot)| slot).collect();
        slots
            .into_iter()
            .filter_map(|slot| slot.lock().take())
            .collect()
    }

    pub fn clear(&self) {
        self.drain();
    }

    /// Number of loaded entries.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot<V>> = self.slots.lock().values().cloned().collect();
        slots.iter().filter(|slot| slot.lock().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
