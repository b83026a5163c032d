use partmap::ShardedMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_inserts() {
    let map = Arc::new(ShardedMap::new());
    let mut handles = vec![];

    // Spawn 10 threads, each inserting 100 items
    for thread_id in 0..10 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..100 {
                let key = format!("thread_{}_key_{}", thread_id, i);
                map.insert(key, i);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(map.len(), 1000);
}

#[test]
fn test_concurrent_reads() {
    let map = Arc::new(ShardedMap::new());

    for i in 0..100 {
        map.insert(format!("key_{}", i), i);
    }

    let mut handles = vec![];

    // Spawn 20 threads, each reading all items
    for _ in 0..20 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..100 {
                let key = format!("key_{}", i);
                let value = map.get(&key).unwrap();
                assert_eq!(*value, i);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_insert_if_absent_single_winner() {
    let map = Arc::new(ShardedMap::new());
    let barrier = Arc::new(Barrier::new(8));
    let winners = Arc::new(AtomicUsize::new(0));
    let mut handles = vec![];

    for thread_id in 0..8 {
        let map = Arc::clone(&map);
        let barrier = Arc::clone(&barrier);
        let winners = Arc::clone(&winners);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..200 {
                if map.insert_if_absent(i, thread_id) {
                    winners.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // Exactly one thread won each key.
    assert_eq!(winners.load(Ordering::Relaxed), 200);
    assert_eq!(map.len(), 200);
}

#[test]
fn test_pop_returns_each_value_once() {
    let map = Arc::new(ShardedMap::new());
    for i in 0..1000 {
        map.insert(i, i);
    }

    let barrier = Arc::new(Barrier::new(4));
    let mut handles = vec![];
    for _ in 0..4 {
        let map = Arc::clone(&map);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut popped = vec![];
            for i in 0..1000 {
                if let Some(value) = map.pop(&i) {
                    assert_eq!(*value, i);
                    popped.push(i);
                }
            }
            popped
        }));
    }

    let mut all: Vec<i32> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    all.sort();

    assert_eq!(all, (0..1000).collect::<Vec<_>>());
    assert!(map.is_empty());
}

#[test]
fn test_disjoint_set_get_remove() {
    let map = Arc::new(ShardedMap::new());
    let mut handles = vec![];

    // Each thread owns keys t*1000..t*1000+1000 and removes every even one.
    for t in 0..8u64 {
        let map = Arc::clone(&map);
        handles.push(thread::spawn(move || {
            let base = t * 1000;
            for i in base..base + 1000 {
                map.insert(i, (i, i * 2));
                let (a, b) = *map.get(&i).unwrap();
                assert_eq!((a, b), (i, i * 2));
                if i % 2 == 0 {
                    map.remove(&i);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(map.len(), 4000);
    for (key, value) in map.elements() {
        assert_eq!(key % 2, 1);
        assert_eq!(*value, (key, key * 2));
    }
}

#[test]
fn test_whole_map_ops_during_writes() {
    let map = Arc::new(ShardedMap::new());
    let barrier = Arc::new(Barrier::new(3));

    let writer = {
        let map = Arc::clone(&map);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for i in 0..5000u32 {
                map.insert(i, i);
                if i % 10 == 0 {
                    map.remove(&(i / 2));
                }
            }
        })
    };

    let scanner = {
        let map = Arc::clone(&map);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..50 {
                // Values seen are always ones that were written.
                for (key, value) in map.elements() {
                    assert_eq!(key, *value);
                }
                map.range(|key, value| {
                    assert_eq!(key, value);
                    true
                });
                let _ = map.len();
                let _ = map.keys();
            }
        })
    };

    barrier.wait();
    writer.join().unwrap();
    scanner.join().unwrap();

    let elements = map.elements();
    assert_eq!(map.len(), elements.len());
}

#[test]
fn test_concurrent_clear() {
    let map = Arc::new(ShardedMap::new());
    let mut handles = vec![];

    for t in 0..4 {
        let map = Arc::clone(&map);
        handles.push(thread::spawn(move || {
            for i in 0..500 {
                map.insert((t, i), i);
                if i % 100 == 0 {
                    map.clear();
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    map.clear();
    assert!(map.is_empty());
}
