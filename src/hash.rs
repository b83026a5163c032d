use crate::config::HashFunction;
use std::hash::{BuildHasher, Hash, Hasher};

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;
const BKDR_MULTIPLIER: u32 = 131;
const DJB_BASIS: u32 = 5381;
const DJB_MULTIPLIER: u32 = 33;

/// Maps a key to an unbounded shard index.
///
/// The map reduces the result modulo its shard count, so implementations do
/// not need to bound their output. The result must be a pure function of the
/// key for the lifetime of the map. A constant function is legal but puts
/// every key in the same shard.
///
/// Any `Fn(&K) -> u64 + Send + Sync` closure is a sharding strategy:
///
/// ```rust
/// use partmap::{Config, ShardedMap};
///
/// let map = ShardedMap::with_sharding(Config::new(), |key: &u64| *key).unwrap();
/// map.insert(7u64, "seven");
/// assert_eq!(map.shard_for(&7), 7);
/// ```
pub trait Sharding<K: ?Sized>: Send + Sync {
    /// Compute the shard index for `key`, before reduction.
    fn shard_index(&self, key: &K) -> u64;
}

impl<K: ?Sized, F> Sharding<K> for F
where
    F: Fn(&K) -> u64 + Send + Sync,
{
    #[inline]
    fn shard_index(&self, key: &K) -> u64 {
        self(key)
    }
}

/// Built-in sharding strategy: feeds the key's `Hash` output through one of
/// the seeded [`HashFunction`]s.
///
/// The seed is drawn at random for every instance unless pinned with
/// [`HashSharding::with_seed`], so two maps generally distribute the same
/// keys differently.
#[derive(Clone)]
pub struct HashSharding {
    function: HashFunction,
    seed: u32,
    ahash: ahash::RandomState,
}

impl HashSharding {
    /// Create a strategy with a freshly randomized seed.
    pub fn new(function: HashFunction) -> Self {
        Self::with_seed(function, random_seed())
    }

    /// Create a strategy with a pinned seed. Useful for deterministic tests.
    pub fn with_seed(function: HashFunction, seed: u32) -> Self {
        let seed64 = u64::from(seed);
        Self {
            function,
            seed,
            ahash: ahash::RandomState::with_seeds(
                seed64,
                seed64.rotate_left(16),
                seed64.rotate_left(32),
                seed64.rotate_left(48),
            ),
        }
    }

    /// The hash function in use.
    pub fn function(&self) -> HashFunction {
        self.function
    }

    /// The seed in use.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Hash a key to determine which shard it belongs to.
    pub fn hash_key<K: Hash + ?Sized>(&self, key: &K) -> u64 {
        match self.function {
            HashFunction::Djb => hash_with(DjbHasher::with_seed(self.seed), key),
            HashFunction::Fnv1 => hash_with(Fnv1Hasher::with_seed(self.seed), key),
            HashFunction::Bkdr => hash_with(BkdrHasher::with_seed(self.seed), key),
            HashFunction::AHash => hash_with(self.ahash.build_hasher(), key),
            #[cfg(feature = "fxhash")]
            HashFunction::FxHash => {
                let mut hasher = fxhash::FxHasher::default();
                hasher.write_u32(self.seed);
                hash_with(hasher, key)
            }
        }
    }
}

impl Default for HashSharding {
    fn default() -> Self {
        Self::new(HashFunction::default())
    }
}

impl std::fmt::Debug for HashSharding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashSharding")
            .field("function", &self.function)
            .field("seed", &self.seed)
            .finish()
    }
}

impl<K: Hash + ?Sized> Sharding<K> for HashSharding {
    #[inline]
    fn shard_index(&self, key: &K) -> u64 {
        self.hash_key(key)
    }
}

#[inline]
fn hash_with<H: Hasher, K: Hash + ?Sized>(mut hasher: H, key: &K) -> u64 {
    key.hash(&mut hasher);
    hasher.finish()
}

/// Draw a per-instance seed from ahash's runtime-seeded `RandomState`.
fn random_seed() -> u32 {
    let mut hasher = ahash::RandomState::new().build_hasher();
    hasher.write_u8(0);
    let hash = hasher.finish();
    (hash ^ (hash >> 32)) as u32
}

/// FNV-1 over a byte stream: multiply by the prime, then xor in the byte.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1Hasher {
    hash: u32,
}

impl Fnv1Hasher {
    /// Start from the offset basis xored with `seed`. Seed 0 is classic FNV-1.
    pub fn with_seed(seed: u32) -> Self {
        Self {
            hash: FNV_OFFSET_BASIS ^ seed,
        }
    }
}

impl Hasher for Fnv1Hasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.hash = self.hash.wrapping_mul(FNV_PRIME) ^ u32::from(byte);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        u64::from(self.hash)
    }
}

/// BKDR polynomial rolling hash: `hash * 131 + byte`.
#[derive(Debug, Clone, Copy)]
pub struct BkdrHasher {
    hash: u32,
}

impl BkdrHasher {
    /// Start the accumulator at `seed`. Seed 0 is classic BKDR.
    pub fn with_seed(seed: u32) -> Self {
        Self { hash: seed }
    }
}

impl Hasher for BkdrHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.hash = self
                .hash
                .wrapping_mul(BKDR_MULTIPLIER)
                .wrapping_add(u32::from(byte));
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        u64::from(self.hash)
    }
}

/// Seeded DJB-style hash. Consumes input four bytes per step with
/// `(hash * 33) ^ byte`, folds in the total length, and finishes with an
/// xor-shift so the high bits reach the low bits used for shard selection.
#[derive(Debug, Clone, Copy)]
pub struct DjbHasher {
    hash: u32,
    len: u32,
}

impl DjbHasher {
    /// Start from the DJB basis offset by `seed`.
    pub fn with_seed(seed: u32) -> Self {
        Self {
            hash: seed.wrapping_add(DJB_BASIS),
            len: 0,
        }
    }
}

#[inline(always)]
fn djb_step(hash: u32, byte: u8) -> u32 {
    hash.wrapping_mul(DJB_MULTIPLIER) ^ u32::from(byte)
}

impl Hasher for DjbHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        let mut hash = self.hash;
        let mut chunks = bytes.chunks_exact(4);
        for chunk in &mut chunks {
            hash = djb_step(hash, chunk[0]);
            hash = djb_step(hash, chunk[1]);
            hash = djb_step(hash, chunk[2]);
            hash = djb_step(hash, chunk[3]);
        }
        for &byte in chunks.remainder() {
            hash = djb_step(hash, byte);
        }
        self.hash = hash;
        self.len = self.len.wrapping_add(bytes.len() as u32);
    }

    #[inline]
    fn finish(&self) -> u64 {
        let hash = self.hash.wrapping_add(self.len);
        u64::from(hash ^ (hash >> 16))
    }
}

/// FNV-1 of raw bytes.
pub fn fnv1(seed: u32, bytes: &[u8]) -> u32 {
    let mut hasher = Fnv1Hasher::with_seed(seed);
    hasher.write(bytes);
    hasher.hash
}

/// BKDR of raw bytes.
pub fn bkdr(seed: u32, bytes: &[u8]) -> u32 {
    let mut hasher = BkdrHasher::with_seed(seed);
    hasher.write(bytes);
    hasher.hash
}

/// Seeded DJB of raw bytes.
pub fn djb(seed: u32, bytes: &[u8]) -> u32 {
    let mut hasher = DjbHasher::with_seed(seed);
    hasher.write(bytes);
    hasher.finish() as u32
}
