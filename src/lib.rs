//! # partmap
//!
//! A concurrent map that partitions its key space across a fixed number of
//! independently locked shards.
//!
//! Every keyed operation locks exactly one shard, chosen by a pluggable
//! sharding function, so readers and writers working on different shards
//! never wait for each other. Whole-map operations visit the shards one at a
//! time and never hold more than one shard lock. Values are stored behind
//! `Arc<T>` so you can share them without copying.
//!
//! ## Features
//!
//! - **Per-shard locking**: one `RwLock` per shard, shared for reads,
//!   exclusive for writes
//! - **Atomic conditional operations**: `insert_if_absent` and `pop` run in a
//!   single critical section
//! - **Pluggable sharding**: built-in seeded DJB, FNV-1, BKDR and ahash
//!   strategies, or any `Fn(&K) -> u64` closure
//! - **Randomized seeds**: each map draws its own seed unless one is pinned
//! - **Statistics**: shard sizes, load ratio and (with `metrics`) per-shard
//!   operation counts
//!
//! ## Example
//!
//! ```rust
//! use partmap::ShardedMap;
//!
//! let map = ShardedMap::new();
//!
//! map.insert("key1", "value1");
//! assert!(!map.insert_if_absent("key1", "other"));
//!
//! if let Some(value) = map.get(&"key1") {
//!     println!("Found: {}", *value);
//! }
//!
//! map.range(|key, value| {
//!     println!("{}: {}", key, value);
//!     true
//! });
//!
//! assert_eq!(map.pop(&"key1").as_deref(), Some(&"value1"));
//! assert!(map.is_empty());
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use partmap::{HashFunction, ShardedMapBuilder};
//!
//! let map = ShardedMapBuilder::new()
//!     .shard_count(16)?
//!     .hash_function(HashFunction::Fnv1)
//!     .seed(7) // reproducible shard assignment
//!     .build::<String, i32>()?;
//!
//! let by_length = ShardedMapBuilder::new()
//!     .shard_count(4)?
//!     .sharding(|key: &String| key.len() as u64)
//!     .build::<String, i32>()?;
//! by_length.insert("bb".to_string(), 2);
//! assert_eq!(by_length.shard_for(&"bb".to_string()), 2);
//! # drop(map);
//! # Ok::<(), partmap::Error>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

/// Configuration and builder types.
pub mod config;
/// Error types.
pub mod error;
/// Sharding strategies and hash functions.
pub mod hash;
mod iter;
mod shard;
/// Main ShardedMap implementation.
pub mod sharded_map;
/// Statistics and metrics collection.
pub mod stats;

// Re-export main types
pub use config::{Config, HashFunction, ShardedMapBuilder, DEFAULT_SHARD_COUNT};
pub use error::Error;
pub use hash::{HashSharding, Sharding};
pub use sharded_map::ShardedMap;
pub use stats::{ShardOps, Stats};
