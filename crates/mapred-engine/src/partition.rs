//! Partition store
//!
//! `P` independently locked buckets. Each bucket owns a key-sorted sequence
//! of pairs plus a byte accumulator (the running sum of pair charges) that
//! the coordinator uses as the reduce job size hint.
//!
//! Pairs are kept in a `Vec` in descending key order, so the smallest key
//! sits at the tail: the reduce-side drain is a plain `pop`, and insertion
//! is a `partition_point` binary search plus shift. Equal keys are adjacent;
//! their relative order is unspecified.

use std::sync::Mutex;

use mapred_core::{default_partitioner, Pair};
use mapred_core::{EngineError, EngineResult};

/// Sharded buffer for emitted pairs.
///
/// `emit` may be called concurrently from any number of threads. The
/// drain side (`head_key`/`next_value`) is single-threaded per partition
/// by the reduce contract: the coordinator runs exactly one reduce job per
/// partition.
pub struct PartitionStore {
    partitions: Box<[Partition]>,
}

struct Partition {
    inner: Mutex<Bucket>,
}

#[derive(Default)]
struct Bucket {
    /// Descending key order; the drain head is the last element.
    pairs: Vec<Pair>,
    /// Running sum of `Pair::charge` over live pairs.
    bytes: u64,
}

impl PartitionStore {
    /// Create a store with `num_partitions` empty buckets.
    pub fn new(num_partitions: usize) -> EngineResult<Self> {
        if num_partitions == 0 {
            return Err(EngineError::NoPartitions);
        }
        let partitions = (0..num_partitions)
            .map(|_| Partition {
                inner: Mutex::new(Bucket::default()),
            })
            .collect();
        Ok(Self { partitions })
    }

    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Copy `(key, value)` into the bucket the partitioner routes it to,
    /// keeping the bucket sorted and charging its byte accumulator.
    pub fn emit(&self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) {
        let key = key.as_ref();
        let value = value.as_ref();
        let index = default_partitioner(key, self.partitions.len());
        let pair = Pair::new(key, value);

        let mut bucket = self.partitions[index].inner.lock().unwrap();
        let pos = bucket.pairs.partition_point(|p| p.key() > key);
        bucket.bytes += pair.charge();
        bucket.pairs.insert(pos, pair);
    }

    /// Detach and return the head value of `partition` if the head key
    /// equals `key`.
    ///
    /// Returns `None` for an out-of-range partition, an empty partition,
    /// or a head with a different key. Because each bucket is key-sorted,
    /// repeated calls with the head key return exactly the multiset of
    /// values emitted for it.
    pub fn next_value(&self, key: impl AsRef<[u8]>, partition: usize) -> Option<Box<[u8]>> {
        let key = key.as_ref();
        let slot = self.partitions.get(partition)?;
        let mut bucket = slot.inner.lock().unwrap();
        match bucket.pairs.last() {
            Some(pair) if pair.key() == key => {}
            _ => return None,
        }
        let pair = bucket.pairs.pop()?;
        bucket.bytes -= pair.charge();
        Some(pair.into_value())
    }

    /// Copy of the smallest not-yet-drained key in `partition`.
    pub fn head_key(&self, partition: usize) -> Option<Box<[u8]>> {
        let slot = self.partitions.get(partition)?;
        let bucket = slot.inner.lock().unwrap();
        bucket.pairs.last().map(|pair| pair.key().into())
    }

    /// Current byte charge of `partition` (0 when out of range).
    pub fn bytes(&self, partition: usize) -> u64 {
        self.partitions
            .get(partition)
            .map(|slot| slot.inner.lock().unwrap().bytes)
            .unwrap_or(0)
    }

    /// Number of live pairs in `partition` (0 when out of range).
    pub fn len(&self, partition: usize) -> usize {
        self.partitions
            .get(partition)
            .map(|slot| slot.inner.lock().unwrap().pairs.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_partitions_rejected() {
        assert!(matches!(
            PartitionStore::new(0),
            Err(EngineError::NoPartitions)
        ));
    }

    #[test]
    fn test_emit_routes_by_partitioner() {
        let store = PartitionStore::new(10).unwrap();
        store.emit("hello", "1");

        let expected = default_partitioner(b"hello", 10);
        assert_eq!(store.len(expected), 1);
        for p in 0..10 {
            if p != expected {
                assert_eq!(store.len(p), 0);
            }
        }
    }

    #[test]
    fn test_drain_is_key_sorted() {
        // A single partition forces every key into one bucket.
        let store = PartitionStore::new(1).unwrap();
        for key in ["pear", "apple", "quince", "banana", "apple"] {
            store.emit(key, "1");
        }

        let mut drained = Vec::new();
        while let Some(key) = store.head_key(0) {
            store.next_value(&key, 0).unwrap();
            drained.push(key.to_vec());
        }
        let mut sorted = drained.clone();
        sorted.sort();
        assert_eq!(drained, sorted);
        assert_eq!(drained.len(), 5);
    }

    #[test]
    fn test_equal_keys_drain_as_multiset() {
        let store = PartitionStore::new(1).unwrap();
        store.emit("dog", "a");
        store.emit("cat", "x");
        store.emit("dog", "b");

        assert_eq!(&*store.head_key(0).unwrap(), b"cat");
        assert_eq!(&*store.next_value("cat", 0).unwrap(), b"x");
        assert!(store.next_value("cat", 0).is_none());

        let mut values = vec![
            store.next_value("dog", 0).unwrap(),
            store.next_value("dog", 0).unwrap(),
        ];
        values.sort();
        assert_eq!(values, vec![b"a".to_vec().into(), b"b".to_vec().into()]);
        assert!(store.next_value("dog", 0).is_none());
        assert_eq!(store.len(0), 0);
    }

    #[test]
    fn test_next_value_wrong_key_is_noop() {
        let store = PartitionStore::new(1).unwrap();
        store.emit("ant", "1");
        assert!(store.next_value("bee", 0).is_none());
        assert_eq!(store.len(0), 1);
    }

    #[test]
    fn test_out_of_range_partition_is_noop() {
        let store = PartitionStore::new(2).unwrap();
        assert!(store.next_value("key", 2).is_none());
        assert!(store.head_key(99).is_none());
        assert_eq!(store.bytes(99), 0);
        assert_eq!(store.len(99), 0);
    }

    #[test]
    fn test_byte_accounting() {
        let store = PartitionStore::new(1).unwrap();
        assert_eq!(store.bytes(0), 0);

        store.emit("cat", "1"); // 3 + 1 + 2
        store.emit("horse", "12"); // 5 + 2 + 2
        assert_eq!(store.bytes(0), 15);

        let key = store.head_key(0).unwrap();
        store.next_value(&key, 0).unwrap();
        assert!(store.bytes(0) < 15);

        while let Some(key) = store.head_key(0) {
            store.next_value(&key, 0).unwrap();
        }
        assert_eq!(store.bytes(0), 0);
    }

    #[test]
    fn test_concurrent_emit_keeps_every_pair() {
        let store = std::sync::Arc::new(PartitionStore::new(4).unwrap());
        let mut handles = Vec::new();
        for t in 0..4 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..500 {
                    store.emit(format!("key-{}", (t * 31 + i * 7) % 50), "1");
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let total: usize = (0..4).map(|p| store.len(p)).sum();
        assert_eq!(total, 2000);
    }
}
