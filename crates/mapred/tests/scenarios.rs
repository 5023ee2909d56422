//! End-to-end engine scenarios: whole runs over real input files, plus the
//! pool/store invariants that are only observable under concurrency.

use mapred::{
    default_partitioner, run, EngineConfig, MapContext, PartitionStore, ReduceContext, ThreadPool,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

fn write_input(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn word_count_mapper(ctx: &MapContext<'_>, path: &Path) {
    let text = fs::read_to_string(path).unwrap();
    for word in text.split_whitespace() {
        ctx.emit(word, "1");
    }
}

/// Counting reducer that records `(key, partition, count)` per invocation.
fn counting_reducer(
    sink: Arc<Mutex<Vec<(Vec<u8>, usize, u64)>>>,
) -> impl Fn(&ReduceContext<'_>, &[u8], usize) + Send + Sync + 'static {
    move |ctx: &ReduceContext<'_>, key: &[u8], partition: usize| {
        let mut count = 0;
        while ctx.next_value(key, partition).is_some() {
            count += 1;
        }
        sink.lock().unwrap().push((key.to_vec(), partition, count));
    }
}

#[test]
fn empty_run_completes() {
    let sink = Arc::new(Mutex::new(Vec::new()));
    run(
        EngineConfig::default().num_workers(4).num_partitions(4),
        &[],
        |_ctx: &MapContext<'_>, _path: &Path| {},
        counting_reducer(sink.clone()),
    )
    .unwrap();

    // Every partition was empty, so the reducer never fired.
    assert!(sink.lock().unwrap().is_empty());
}

#[test]
fn single_word_reduces_in_its_hash_partition() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "hello.txt", "hello\n");
    let sink = Arc::new(Mutex::new(Vec::new()));

    run(
        EngineConfig::default().num_workers(4).num_partitions(10),
        &[input],
        word_count_mapper,
        counting_reducer(sink.clone()),
    )
    .unwrap();

    let calls = sink.lock().unwrap();
    assert_eq!(
        *calls,
        vec![(
            b"hello".to_vec(),
            default_partitioner(b"hello", 10),
            1
        )]
    );
}

#[test]
fn small_word_count_aggregates_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_input(&dir, "a.txt", "the cat sat");
    let b = write_input(&dir, "b.txt", "the cat ate");
    let sink = Arc::new(Mutex::new(Vec::new()));

    run(
        EngineConfig::default().num_workers(2).num_partitions(2),
        &[a, b],
        word_count_mapper,
        counting_reducer(sink.clone()),
    )
    .unwrap();

    let mut counts: Vec<(Vec<u8>, u64)> = sink
        .lock()
        .unwrap()
        .iter()
        .map(|(key, _partition, count)| (key.clone(), *count))
        .collect();
    counts.sort();
    assert_eq!(
        counts,
        vec![
            (b"ate".to_vec(), 1),
            (b"cat".to_vec(), 2),
            (b"sat".to_vec(), 1),
            (b"the".to_vec(), 2),
        ]
    );
}

#[test]
fn reduce_visits_keys_in_ascending_order_per_partition() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        &dir,
        "words.txt",
        "pear apple quince banana apple fig date date grape",
    );
    let sink = Arc::new(Mutex::new(Vec::new()));

    run(
        EngineConfig::default().num_workers(3).num_partitions(3),
        &[input],
        word_count_mapper,
        counting_reducer(sink.clone()),
    )
    .unwrap();

    let calls = sink.lock().unwrap();
    let mut per_partition: HashMap<usize, Vec<Vec<u8>>> = HashMap::new();
    for (key, partition, _count) in calls.iter() {
        per_partition
            .entry(*partition)
            .or_default()
            .push(key.clone());
    }
    for keys in per_partition.values() {
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, &sorted);
    }
}

#[test]
fn concurrent_emit_preserves_the_pair_multiset() {
    // Eight map-style jobs hammering the store through the pool, then a
    // full drain checking count, per-partition sort order, routing, and
    // multiset equality with what was emitted.
    const JOBS: usize = 8;
    const PAIRS_PER_JOB: usize = 10_000;
    const PARTITIONS: usize = 16;

    let alphabet: Vec<String> = (0..200).map(|i| format!("w{:03}", i)).collect();
    let store = Arc::new(PartitionStore::new(PARTITIONS).unwrap());
    let pool = ThreadPool::new(JOBS).unwrap();
    let emitted = Arc::new(Mutex::new(HashMap::<Vec<u8>, u64>::new()));

    for job in 0..JOBS {
        let alphabet = alphabet.clone();
        let store = store.clone();
        let emitted = emitted.clone();
        pool.submit(
            move || {
                let mut rng = SmallRng::seed_from_u64(job as u64);
                let mut local = HashMap::<Vec<u8>, u64>::new();
                for _ in 0..PAIRS_PER_JOB {
                    let word = &alphabet[rng.random_range(0..alphabet.len())];
                    store.emit(word, "1");
                    *local.entry(word.as_bytes().to_vec()).or_insert(0) += 1;
                }
                let mut emitted = emitted.lock().unwrap();
                for (key, count) in local {
                    *emitted.entry(key).or_insert(0) += count;
                }
            },
            PAIRS_PER_JOB as u64,
        )
        .unwrap();
    }
    pool.wait_idle();
    pool.join();

    let total: usize = (0..PARTITIONS).map(|p| store.len(p)).sum();
    assert_eq!(total, JOBS * PAIRS_PER_JOB);

    let mut drained = HashMap::<Vec<u8>, u64>::new();
    for partition in 0..PARTITIONS {
        let mut previous: Option<Box<[u8]>> = None;
        while let Some(key) = store.head_key(partition) {
            if let Some(previous) = &previous {
                assert!(previous <= &key);
            }
            assert_eq!(default_partitioner(&key, PARTITIONS), partition);
            store.next_value(&key, partition).unwrap();
            *drained.entry(key.to_vec()).or_insert(0) += 1;
            previous = Some(key);
        }
        assert_eq!(store.bytes(partition), 0);
    }
    assert_eq!(drained, *emitted.lock().unwrap());
}

#[test]
fn runs_are_independent() {
    // Two full runs in flight at once: per-run state means neither can
    // see the other's pairs.
    let dir = tempfile::tempdir().unwrap();
    let first = write_input(&dir, "first.txt", "red green red");
    let second = write_input(&dir, "second.txt", "blue");

    let handles: Vec<_> = [(first, 3usize), (second, 1usize)]
        .into_iter()
        .map(|(input, expected_total)| {
            std::thread::spawn(move || {
                let sink = Arc::new(Mutex::new(Vec::new()));
                run(
                    EngineConfig::default().num_workers(2).num_partitions(4),
                    &[input],
                    word_count_mapper,
                    counting_reducer(sink.clone()),
                )
                .unwrap();
                let total: u64 = sink.lock().unwrap().iter().map(|(_, _, n)| n).sum();
                assert_eq!(total, expected_total as u64);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
