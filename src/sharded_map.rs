use crate::config::Config;
use crate::error::Error;
use crate::hash::{HashSharding, Sharding};
use crate::iter;
use crate::shard::Shard;
use crate::stats::{ShardOps, Stats};
use hashbrown::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Concurrent map partitioned across independently locked shards.
///
/// Every keyed operation locks exactly one shard, the one at
/// `sharding.shard_index(key) % shard_count`, so operations on keys in
/// different shards never block each other. Values are wrapped in `Arc<V>`
/// so reads hand them out without copying.
///
/// Whole-map operations (`len`, `keys`, `elements`, `clear`, `range`, `stats`)
/// visit the shards one after another and never hold two shard locks at once.
/// They are therefore not atomic across the map: a concurrent writer can
/// change a shard that was already visited or not yet reached, and the
/// aggregate may mix states from different moments. Callers that need a
/// point-in-time view must stop their writers first.
///
/// # Example
///
/// ```rust
/// use partmap::ShardedMap;
///
/// let map = ShardedMap::new();
/// map.insert("key1", "value1");
///
/// if let Some(value) = map.get(&"key1") {
///     println!("Found: {}", *value);
/// }
/// ```
pub struct ShardedMap<K, V, S = HashSharding> {
    shards: Vec<Shard<K, V>>,
    sharding: S,
}

impl<K, V> ShardedMap<K, V>
where
    K: Hash + Eq + Send + Sync,
    V: Send + Sync,
{
    /// Create a new map with defaults (32 shards, seeded DJB hash).
    pub fn new() -> Self {
        Self::from_parts(Config::default(), HashSharding::default())
    }

    /// Create a new map with custom config and the default hash strategy.
    pub fn with_config(config: Config) -> Result<Self, Error> {
        Self::with_sharding(config, HashSharding::default())
    }
}

impl<K, V, S> ShardedMap<K, V, S>
where
    K: Hash + Eq + Send + Sync,
    V: Send + Sync,
    S: Sharding<K>,
{
    /// Create a new map with custom config and sharding strategy.
    pub fn with_sharding(config: Config, sharding: S) -> Result<Self, Error> {
        if config.shard_count == 0 {
            return Err(Error::InvalidShardCount);
        }
        Ok(Self::from_parts(config, sharding))
    }

    fn from_parts(config: Config, sharding: S) -> Self {
        let shards = (0..config.shard_count)
            .map(|_| match config.capacity_per_shard {
                Some(capacity) => Shard::with_capacity(capacity),
                None => Shard::new(),
            })
            .collect();

        tracing::debug!(
            shard_count = config.shard_count,
            capacity_per_shard = ?config.capacity_per_shard,
            sharding = std::any::type_name::<S>(),
            "sharded map created"
        );

        Self { shards, sharding }
    }

    /// Number of shards, fixed at construction.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Index of the shard that owns `key`. Stable for the lifetime of the map.
    #[inline]
    pub fn shard_for(&self, key: &K) -> usize {
        let index = self.sharding.shard_index(key);
        (index % self.shards.len() as u64) as usize
    }

    #[inline]
    fn shard(&self, key: &K) -> &Shard<K, V> {
        &self.shards[self.shard_for(key)]
    }

    /// Insert a key-value pair, overwriting any existing entry. Returns the
    /// old value if the key existed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use partmap::ShardedMap;
    ///
    /// let map = ShardedMap::new();
    /// assert!(map.insert("key", "value").is_none());
    /// assert_eq!(map.insert("key", "new_value").unwrap().as_ref(), &"value");
    /// ```
    pub fn insert(&self, key: K, value: V) -> Option<Arc<V>> {
        self.shard(&key).insert(key, value)
    }

    /// Insert only if the key is absent. Returns `true` if the value was
    /// inserted; an existing value is never overwritten.
    ///
    /// # Example
    ///
    /// ```rust
    /// use partmap::ShardedMap;
    ///
    /// let map = ShardedMap::new();
    /// assert!(map.insert_if_absent("key", 1));
    /// assert!(!map.insert_if_absent("key", 2));
    /// assert_eq!(*map.get(&"key").unwrap(), 1);
    /// ```
    pub fn insert_if_absent(&self, key: K, value: V) -> bool {
        self.shard(&key).insert_if_absent(key, value)
    }

    /// Get a value by key. Returns an `Arc<V>` so you can share it without copying.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.shard(key).get(key)
    }

    /// Check whether `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.shard(key).contains_key(key)
    }

    /// Remove a key. Returns `false` and leaves the map untouched if it was
    /// absent.
    pub fn remove(&self, key: &K) -> bool {
        self.shard(key).remove(key).is_some()
    }

    /// Remove a key and return its value. The read and the delete happen in
    /// one critical section, so each stored value is popped at most once.
    ///
    /// # Example
    ///
    /// ```rust
    /// use partmap::ShardedMap;
    ///
    /// let map = ShardedMap::new();
    /// map.insert("key", "value");
    /// assert_eq!(map.pop(&"key").unwrap().as_ref(), &"value");
    /// assert!(map.pop(&"key").is_none());
    /// ```
    pub fn pop(&self, key: &K) -> Option<Arc<V>> {
        self.shard(key).remove(key)
    }

    /// Empty every shard, one shard at a time.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.clear();
        }
        tracing::debug!(shard_count = self.shards.len(), "sharded map cleared");
    }

    /// Get the total number of entries across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.len()).sum()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.is_empty())
    }

    /// Number of entries in each shard, in shard order.
    pub fn shard_sizes(&self) -> Vec<usize> {
        self.shards.iter().map(|shard| shard.len()).collect()
    }

    /// Get detailed statistics about the map and its shards.
    pub fn stats(&self) -> Stats {
        let shard_sizes = self.shard_sizes();
        let operations: Vec<ShardOps> = self.shards.iter().map(|s| s.stats()).collect();
        let size: usize = shard_sizes.iter().sum();

        Stats {
            size,
            shard_sizes,
            operations,
        }
    }

    /// Collect all keys, shard by shard.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        iter::collect_keys(&self.shards, self.len())
    }

    /// Copy all entries into a fresh table, shard by shard. Values are shared
    /// with the map through their `Arc`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use partmap::ShardedMap;
    ///
    /// let map = ShardedMap::new();
    /// map.insert("key1", 1);
    /// map.insert("key2", 2);
    ///
    /// let elements = map.elements();
    /// assert_eq!(elements.len(), 2);
    /// assert_eq!(*elements[&"key2"], 2);
    /// ```
    pub fn elements(&self) -> HashMap<K, Arc<V>>
    where
        K: Clone,
    {
        iter::collect_elements(&self.shards, self.len())
    }

    /// Call `visit` for each entry until it returns `false`.
    ///
    /// No lock is held while `visit` runs, so it may freely call back into the
    /// map. The walk sees a moving view: entries removed before their turn are
    /// skipped, values reflect the moment each entry is reached, and keys
    /// inserted into a shard after the walk entered it are not visited. Use
    /// [`elements`](Self::elements) for a copy instead.
    ///
    /// # Example
    ///
    /// ```rust
    /// use partmap::ShardedMap;
    ///
    /// let map = ShardedMap::new();
    /// for i in 0..10 {
    ///     map.insert(i, i * 10);
    /// }
    ///
    /// let mut seen = 0;
    /// map.range(|_key, _value| {
    ///     seen += 1;
    ///     seen < 3
    /// });
    /// assert_eq!(seen, 3);
    /// ```
    pub fn range<F>(&self, visit: F)
    where
        K: Clone,
        F: FnMut(&K, &V) -> bool,
    {
        iter::range(&self.shards, visit)
    }
}

impl<K, V> Default for ShardedMap<K, V>
where
    K: Hash + Eq + Send + Sync,
    V: Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashFunction;

    #[test]
    fn test_shard_for_is_stable() {
        let map: ShardedMap<String, i32> = ShardedMap::new();
        for i in 0..100 {
            let key = format!("key_{}", i);
            let shard = map.shard_for(&key);
            assert!(shard < map.shard_count());
            assert_eq!(shard, map.shard_for(&key));
        }
    }

    #[test]
    fn test_keys_land_in_their_shard() {
        let sharding = HashSharding::with_seed(HashFunction::Fnv1, 3);
        let config = Config::new().shard_count(5).unwrap();
        let map = ShardedMap::with_sharding(config, sharding).unwrap();
        for i in 0..200u32 {
            map.insert(i, i);
        }

        for (index, shard) in map.shards.iter().enumerate() {
            for key in shard.keys() {
                assert_eq!(map.shard_for(&key), index);
            }
        }
        assert_eq!(map.shard_sizes().iter().sum::<usize>(), 200);
    }

    #[test]
    fn test_constant_sharding_degrades_to_one_shard() {
        let config = Config::new().shard_count(4).unwrap();
        let map = ShardedMap::with_sharding(config, |_: &u32| 0u64).unwrap();
        for i in 0..10u32 {
            map.insert(i, ());
        }
        assert_eq!(map.shard_sizes(), vec![10, 0, 0, 0]);
    }

    #[test]
    fn test_capacity_per_shard() {
        let config = Config::new()
            .shard_count(2)
            .unwrap()
            .capacity_per_shard(64);
        let map: ShardedMap<u64, u64> = ShardedMap::with_config(config).unwrap();
        for shard in &map.shards {
            assert!(shard.read().capacity() >= 64);
        }
    }
}
