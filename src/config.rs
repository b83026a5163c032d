use crate::error::Error;
use crate::hash::{HashSharding, Sharding};
use std::hash::Hash;

/// Default number of shards.
pub const DEFAULT_SHARD_COUNT: usize = 32;

/// Which built-in hash function [`HashSharding`] uses for shard assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashFunction {
    /// Seeded DJB variant with a final xor-shift (default).
    #[default]
    Djb,
    /// FNV-1 with the seed folded into the offset basis.
    Fnv1,
    /// BKDR polynomial hash (`hash * 131 + byte`) starting from the seed.
    Bkdr,
    /// ahash keyed by the seed.
    AHash,
    /// fxhash with the seed hashed ahead of the key.
    #[cfg(feature = "fxhash")]
    FxHash,
}

/// Partitioning parameters for a ShardedMap instance.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) shard_count: usize,
    pub(crate) capacity_per_shard: Option<usize>,
}

impl Config {
    /// Create a new config with defaults (32 shards).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shards. Must be greater than 0.
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        if count == 0 {
            return Err(Error::InvalidShardCount);
        }
        self.shard_count = count;
        Ok(self)
    }

    /// Set initial capacity per shard. Total capacity will be approximately
    /// `capacity_per_shard * shard_count`. Omitted by default (HashMap default).
    pub fn capacity_per_shard(mut self, capacity: usize) -> Self {
        self.capacity_per_shard = Some(capacity);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            capacity_per_shard: None,
        }
    }
}

/// Builder for creating a ShardedMap with custom configuration.
///
/// Every option can be repeated (the last call wins) and is independent of
/// the others, except that [`sharding`](Self::sharding) replaces the built-in
/// hash strategy, so `hash_function` and `seed` have no effect after it.
///
/// ```rust
/// use partmap::{HashFunction, ShardedMapBuilder};
///
/// let map = ShardedMapBuilder::new()
///     .shard_count(8)?
///     .hash_function(HashFunction::Fnv1)
///     .seed(42)
///     .build::<String, i32>()?;
/// map.insert("answer".to_string(), 42);
/// # Ok::<(), partmap::Error>(())
/// ```
#[derive(Debug)]
pub struct ShardedMapBuilder<S = HashSharding> {
    config: Config,
    sharding: S,
}

impl ShardedMapBuilder<HashSharding> {
    /// Create a new builder with default configuration and a random seed.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            sharding: HashSharding::default(),
        }
    }

    /// Set the built-in hash function, keeping the current seed.
    pub fn hash_function(mut self, hash_fn: HashFunction) -> Self {
        self.sharding = HashSharding::with_seed(hash_fn, self.sharding.seed());
        self
    }

    /// Pin the hash seed so shard assignment is reproducible across runs.
    pub fn seed(mut self, seed: u32) -> Self {
        self.sharding = HashSharding::with_seed(self.sharding.function(), seed);
        self
    }
}

impl<S> ShardedMapBuilder<S> {
    /// Set the number of shards. Must be greater than 0.
    pub fn shard_count(mut self, count: usize) -> Result<Self, Error> {
        self.config = self.config.shard_count(count)?;
        Ok(self)
    }

    /// Set initial capacity per shard. Total capacity ≈ `capacity_per_shard * shard_count`.
    pub fn capacity_per_shard(mut self, capacity: usize) -> Self {
        self.config = self.config.capacity_per_shard(capacity);
        self
    }

    /// Use a custom sharding strategy instead of the built-in hash.
    pub fn sharding<T>(self, sharding: T) -> ShardedMapBuilder<T> {
        ShardedMapBuilder {
            config: self.config,
            sharding,
        }
    }

    /// Build a ShardedMap with the configured settings.
    pub fn build<K, V>(self) -> Result<crate::ShardedMap<K, V, S>, Error>
    where
        K: Hash + Eq + Send + Sync,
        V: Send + Sync,
        S: Sharding<K>,
    {
        crate::ShardedMap::with_sharding(self.config, self.sharding)
    }
}

impl Default for ShardedMapBuilder<HashSharding> {
    fn default() -> Self {
        Self::new()
    }
}
