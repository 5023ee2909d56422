//! Default key partitioner
//!
//! djb2 over the key bytes, reduced modulo the partition count. The exact
//! arithmetic is part of the public contract: drivers reconstruct output
//! file names from partition indices, so every implementation detail of the
//! hash (seed 5381, multiplier 33, unsigned 64-bit wrap) must stay fixed.

/// Map `key` to a partition index in `[0, num_partitions)`.
///
/// # Panics
///
/// Panics if `num_partitions` is zero, in every build profile: the final
/// modulo divides by it. The debug assertion only moves that failure to a
/// clearer message in debug builds. The stores that call this reject zero
/// partition counts at construction.
#[inline]
pub fn default_partitioner(key: &[u8], num_partitions: usize) -> usize {
    debug_assert!(num_partitions > 0);
    let mut hash: u64 = 5381;
    for &byte in key {
        // hash * 33 + byte
        hash = (hash << 5).wrapping_add(hash).wrapping_add(byte as u64);
    }
    (hash % num_partitions as u64) as usize
}
