//! Statistics and load-balance introspection.

#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-shard operation counters. All zero when the `metrics` feature is off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardOps {
    /// Lookups that found their key (`get`, `contains_key`).
    pub reads: u64,
    /// Inserts of new keys and overwrites.
    pub writes: u64,
    /// Removals that found their key (`remove`, `pop`).
    pub removes: u64,
    /// Number of times this shard's lock was taken, in either mode.
    pub lock_acquisitions: u64,
}

/// Thread-safe statistics tracker for a single shard.
#[cfg(feature = "metrics")]
pub(crate) struct ShardStats {
    reads: AtomicU64,
    writes: AtomicU64,
    removes: AtomicU64,
    lock_acquisitions: AtomicU64,
}

#[cfg(feature = "metrics")]
impl ShardStats {
    pub fn new() -> Self {
        Self {
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            removes: AtomicU64::new(0),
            lock_acquisitions: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_lock_acquisition(&self) {
        self.lock_acquisitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ShardOps {
        ShardOps {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            lock_acquisitions: self.lock_acquisitions.load(Ordering::Relaxed),
        }
    }
}

/// Zero-sized placeholder when metrics are disabled.
#[cfg(not(feature = "metrics"))]
pub(crate) struct ShardStats;

#[cfg(not(feature = "metrics"))]
impl ShardStats {
    pub fn new() -> Self {
        ShardStats
    }

    #[inline]
    pub fn record_read(&self) {}

    #[inline]
    pub fn record_write(&self) {}

    #[inline]
    pub fn record_remove(&self) {}

    #[inline]
    pub fn record_lock_acquisition(&self) {}

    pub fn snapshot(&self) -> ShardOps {
        ShardOps::default()
    }
}

/// Aggregate statistics for a ShardedMap instance.
///
/// Gathered shard by shard, so under concurrent writes the figures may mix
/// states from different moments.
#[derive(Debug, Clone)]
pub struct Stats {
    /// Total number of entries across all shards.
    pub size: usize,
    /// Number of entries in each shard.
    pub shard_sizes: Vec<usize>,
    /// Operation counts for each shard.
    pub operations: Vec<ShardOps>,
}

impl Stats {
    /// Average number of entries per shard.
    pub fn avg_load_per_shard(&self) -> f64 {
        if self.shard_sizes.is_empty() {
            return 0.0;
        }
        self.size as f64 / self.shard_sizes.len() as f64
    }

    /// Ratio of the fullest shard to the average. 1.0 is a perfect spread;
    /// an empty map reports 0.0.
    pub fn max_load_ratio(&self) -> f64 {
        let avg = self.avg_load_per_shard();
        if avg == 0.0 {
            return 0.0;
        }
        let max = self.shard_sizes.iter().copied().max().unwrap_or(0);
        max as f64 / avg
    }

    /// Sum of reads, writes and removes over all shards.
    pub fn total_operations(&self) -> u64 {
        self.operations
            .iter()
            .map(|op| op.reads + op.writes + op.removes)
            .sum()
    }
}
