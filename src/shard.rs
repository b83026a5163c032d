use crate::stats::ShardStats;
use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::hash::Hash;
use std::sync::Arc;

/// A single shard containing a HashMap protected by a read-write lock.
///
/// The table is only reachable through [`Shard::read`] and [`Shard::write`],
/// so every access holds the lock in the matching mode.
pub(crate) struct Shard<K, V> {
    map: RwLock<HashMap<K, Arc<V>>>,
    stats: ShardStats,
}

impl<K, V> Shard<K, V>
where
    K: Hash + Eq + Send + Sync,
    V: Send + Sync,
{
    pub fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
            stats: ShardStats::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: RwLock::new(HashMap::with_capacity(capacity)),
            stats: ShardStats::new(),
        }
    }

    /// Take the shared lock.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, HashMap<K, Arc<V>>> {
        self.stats.record_lock_acquisition();
        self.map.read()
    }

    /// Take the exclusive lock.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, Arc<V>>> {
        self.stats.record_lock_acquisition();
        self.map.write()
    }

    /// Insert a key-value pair, returning the previous value if any.
    pub fn insert(&self, key: K, value: V) -> Option<Arc<V>> {
        let result = self.write().insert(key, Arc::new(value));
        self.stats.record_write();
        result
    }

    /// Insert only if the key is absent. Check and insert share one critical
    /// section, so two racing callers cannot both succeed.
    pub fn insert_if_absent(&self, key: K, value: V) -> bool {
        let mut map = self.write();
        if map.contains_key(&key) {
            return false;
        }
        map.insert(key, Arc::new(value));
        drop(map);
        self.stats.record_write();
        true
    }

    /// Get a value by key, returning an Arc to enable zero-copy access.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let result = self.read().get(key).cloned();
        if result.is_some() {
            self.stats.record_read();
        }
        result
    }

    /// Check if a key exists without cloning the value.
    pub fn contains_key(&self, key: &K) -> bool {
        let found = self.read().contains_key(key);
        if found {
            self.stats.record_read();
        }
        found
    }

    /// Remove a key-value pair, returning the value if it existed.
    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        let result = self.write().remove(key);
        if result.is_some() {
            self.stats.record_remove();
        }
        result
    }

    /// Replace the table with an empty one.
    pub fn clear(&self) {
        let mut map = self.write();
        *map = HashMap::new();
    }

    /// Get the number of entries in this shard.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if this shard is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Get a snapshot of statistics for this shard.
    pub fn stats(&self) -> crate::stats::ShardOps {
        self.stats.snapshot()
    }
}

impl<K, V> Shard<K, V>
where
    K: Hash + Eq + Send + Sync + Clone,
    V: Send + Sync,
{
    /// Clone out the current key set under the shared lock.
    pub fn keys(&self) -> Vec<K> {
        self.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_if_absent_keeps_first_value() {
        let shard = Shard::new();
        assert!(shard.insert_if_absent("k", 1));
        assert!(!shard.insert_if_absent("k", 2));
        assert_eq!(*shard.get(&"k").unwrap(), 1);
    }

    #[test]
    fn test_clear_empties_table() {
        let shard = Shard::with_capacity(16);
        shard.insert(1, "a");
        shard.insert(2, "b");
        assert_eq!(shard.len(), 2);

        shard.clear();
        assert!(shard.is_empty());
        assert!(shard.keys().is_empty());
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_counters() {
        let shard = Shard::new();
        shard.insert("a", 1);
        shard.get(&"a");
        shard.get(&"missing");
        shard.remove(&"a");

        let ops = shard.stats();
        assert_eq!(ops.writes, 1);
        assert_eq!(ops.reads, 1);
        assert_eq!(ops.removes, 1);
        assert_eq!(ops.lock_acquisitions, 4);
    }
}
