//! Stress test - concurrent emits
//!
//! Hammers the partition store from many pool jobs at once, then verifies
//! the stored pairs and reports throughput.

use mapred::{default_partitioner, PartitionStore, ThreadPool};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

fn main() {
    println!("=== mapred Stress Test ===\n");

    let num_pairs: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1_000_000);
    let num_workers: usize = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(8);
    let num_partitions: usize = std::env::args()
        .nth(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or(16);

    println!(
        "Emitting {} pairs from {} workers into {} partitions...",
        num_pairs, num_workers, num_partitions
    );

    let alphabet: Vec<String> = (0..200).map(|i| format!("word-{:03}", i)).collect();
    let store = Arc::new(PartitionStore::new(num_partitions).expect("partition count"));
    let pool = ThreadPool::new(num_workers).expect("worker count");
    let emitted = Arc::new(AtomicU64::new(0));

    let start = Instant::now();
    let per_job = num_pairs / num_workers;

    for job in 0..num_workers {
        let alphabet = alphabet.clone();
        let store = store.clone();
        let emitted = emitted.clone();
        pool.submit(
            move || {
                let mut rng = SmallRng::seed_from_u64(job as u64);
                for _ in 0..per_job {
                    let word = &alphabet[rng.random_range(0..alphabet.len())];
                    store.emit(word, "1");
                }
                emitted.fetch_add(per_job as u64, Ordering::Relaxed);
            },
            per_job as u64,
        )
        .expect("submit");
    }

    pool.wait_idle();
    let emit_time = start.elapsed();

    println!("Emit time:  {:?}", emit_time);
    println!(
        "Emit rate:  {:.0} pairs/sec",
        emitted.load(Ordering::Relaxed) as f64 / emit_time.as_secs_f64()
    );

    // Verify what landed in the store before draining it.
    let stored: usize = (0..num_partitions).map(|p| store.len(p)).sum();
    assert_eq!(stored as u64, emitted.load(Ordering::Relaxed));

    println!("\nDraining and verifying sort order...");
    let drain_start = Instant::now();
    let mut drained: u64 = 0;
    for partition in 0..num_partitions {
        let mut previous: Option<Box<[u8]>> = None;
        while let Some(key) = store.head_key(partition) {
            if let Some(previous) = &previous {
                assert!(
                    previous <= &key,
                    "keys out of order in partition {}",
                    partition
                );
            }
            assert_eq!(default_partitioner(&key, num_partitions), partition);
            while store.next_value(&key, partition).is_some() {
                drained += 1;
            }
            previous = Some(key);
        }
    }
    let drain_time = drain_start.elapsed();

    pool.join();

    println!("\n=== Results ===");
    println!("Pairs emitted: {}", emitted.load(Ordering::Relaxed));
    println!("Pairs drained: {}", drained);
    println!("Emit time:     {:?}", emit_time);
    println!("Drain time:    {:?}", drain_time);
    println!("Total time:    {:?}", start.elapsed());

    assert_eq!(drained, emitted.load(Ordering::Relaxed));
    println!("\n=== Stress Test Complete ===");
}
