//! Cache Store Module
//!
//! Key to entry mapping behind a single reader/writer lock, with lazy expiry
//! checks on reads and an explicit scan used by the sweeper.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, StatsCounters, Ttl};

type Entries<V> = HashMap<String, CacheEntry<V>>;

// == Cache Store ==
/// Thread-safe expiring item store.
///
/// Reads (`get`, `len`) take the shared lock; every mutation, including the
/// sweeper's scan, takes the exclusive lock. Expired entries stay in the map
/// until [`CacheStore::remove_expired`] runs.
pub struct CacheStore<V> {
    /// Key-value storage
    entries: RwLock<Entries<V>>,
    /// Time source for every expiry decision
    clock: Arc<dyn Clock>,
    /// TTL applied by `Ttl::Default`; zero means never expire
    default_ttl: Duration,
    /// Read and eviction statistics
    stats: StatsCounters,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL used for `Ttl::Default`; zero means never expire
    /// * `clock` - Time source for expiry decisions
    pub fn new(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            default_ttl,
            stats: StatsCounters::new(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries<V>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries<V>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    // == Set ==
    /// Stores a value, replacing any existing entry for the key.
    ///
    /// `None` is the empty value: storing it is a silent no-op and any
    /// existing entry is left untouched. Returns whether anything was stored.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Option<V>>, ttl: Ttl) -> bool {
        let key = key.into();
        let Some(value) = value.into() else {
            debug!(key = %key, "ignoring set with empty value");
            return false;
        };

        let expires_at = ttl.resolve(self.default_ttl, self.clock.now());
        self.write().insert(key, CacheEntry::new(value, expires_at));
        true
    }

    // == Touch ==
    /// Recomputes the expiry of an existing key, leaving its value unchanged.
    ///
    /// Returns false, without creating anything, if the key is absent.
    pub fn touch(&self, key: &str, ttl: Ttl) -> bool {
        let now = self.clock.now();
        let mut entries = self.write();
        match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = ttl.resolve(self.default_ttl, now);
                true
            }
            None => false,
        }
    }

    // == Remove ==
    /// Deletes a key unconditionally, returning the value that was present.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.write().remove(key).map(|entry| entry.value)
    }

    // == Flush ==
    /// Replaces the whole mapping with an empty one.
    pub fn flush(&self) {
        *self.write() = HashMap::new();
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones that
    /// have not been swept yet.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    // == Is Empty ==
    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    // == Remove Expired ==
    /// Removes every entry expired as of a single sampled instant.
    ///
    /// Returns the removed `(key, value)` pairs so callers can notify outside
    /// the lock.
    pub fn remove_expired(&self) -> Vec<(String, V)> {
        let now = self.clock.now();
        let mut entries = self.write();

        let expired_keys: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        let evicted: Vec<(String, V)> = expired_keys
            .into_iter()
            .filter_map(|key| entries.remove(&key).map(|entry| (key, entry.value)))
            .collect();
        drop(entries);

        self.stats.record_evictions(evicted.len());
        evicted
    }
}

impl<V: Clone> CacheStore<V> {
    // == Get ==
    /// Returns the value if the key is present and not expired.
    ///
    /// Expired entries are reported as absent but left for the sweeper.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_with_ttl(key).map(|(value, _)| value)
    }

    /// Like [`CacheStore::get`], also returning the remaining lifetime
    /// (`None` for entries that never expire).
    pub fn get_with_ttl(&self, key: &str) -> Option<(V, Option<Duration>)> {
        let now = self.clock.now();
        let found = self
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| (entry.value.clone(), entry.ttl_remaining(now)));

        match found {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        found
    }
}
