use crate::shard::Shard;
use hashbrown::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Visit every entry without holding any shard lock while `visit` runs.
///
/// Shards are walked in index order. For each shard the key set is captured
/// under the shared lock, then each key is looked up again under a fresh
/// shared lock right before its visit. Entries removed in the meantime are
/// skipped and entries inserted after the capture are not seen, so the walk
/// observes a moving view rather than a point-in-time snapshot.
pub(crate) fn range<K, V, F>(shards: &[Shard<K, V>], mut visit: F)
where
    K: Hash + Eq + Send + Sync + Clone,
    V: Send + Sync,
    F: FnMut(&K, &V) -> bool,
{
    for shard in shards {
        let keys = shard.keys();
        for key in keys {
            let value = match shard.read().get(&key) {
                Some(value) => Arc::clone(value),
                None => continue,
            };
            if !visit(&key, &*value) {
                return;
            }
        }
    }
}

/// Collect keys shard by shard.
pub(crate) fn collect_keys<K, V>(shards: &[Shard<K, V>], capacity: usize) -> Vec<K>
where
    K: Hash + Eq + Send + Sync + Clone,
    V: Send + Sync,
{
    let mut keys = Vec::with_capacity(capacity);
    for shard in shards {
        let map = shard.read();
        keys.extend(map.keys().cloned());
    }
    keys
}

/// Copy every entry into a fresh table, shard by shard.
pub(crate) fn collect_elements<K, V>(
    shards: &[Shard<K, V>],
    capacity: usize,
) -> HashMap<K, Arc<V>>
where
    K: Hash + Eq + Send + Sync + Clone,
    V: Send + Sync,
{
    let mut elements = HashMap::with_capacity(capacity);
    for shard in shards {
        let map = shard.read();
        for (key, value) in map.iter() {
            elements.insert(key.clone(), Arc::clone(value));
        }
    }
    elements
}
