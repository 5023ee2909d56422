//! Two-phase run coordinator
//!
//! Drives a full map/reduce execution: size the inputs, submit map jobs
//! smallest-file-first, barrier, submit one reduce job per partition
//! smallest-charge-first, barrier, tear down.
//!
//! There is no process-wide state. Each run owns its partition store and
//! pool, and callbacks reach the store through the context they are handed,
//! so independent runs may execute concurrently in one process.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mapred_core::{mrdebug, mrprint, EngineResult};

use crate::config::EngineConfig;
use crate::partition::PartitionStore;
use crate::pool::ThreadPool;

/// Handle passed to map callbacks.
pub struct MapContext<'a> {
    store: &'a PartitionStore,
}

impl MapContext<'_> {
    /// Route a `(key, value)` pair into its partition.
    ///
    /// Both byte strings are copied into engine-owned memory; the engine
    /// keeps them until a reducer drains the pair.
    pub fn emit(&self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) {
        self.store.emit(key, value);
    }

    pub fn num_partitions(&self) -> usize {
        self.store.num_partitions()
    }
}

/// Handle passed to reduce callbacks.
pub struct ReduceContext<'a> {
    store: &'a PartitionStore,
}

impl ReduceContext<'_> {
    /// Detach and return one value for `key` from the head of `partition`,
    /// or `None` once `key`'s values are exhausted.
    ///
    /// The returned value is owned by the caller.
    pub fn next_value(&self, key: impl AsRef<[u8]>, partition: usize) -> Option<Box<[u8]>> {
        self.store.next_value(key, partition)
    }

    pub fn num_partitions(&self) -> usize {
        self.store.num_partitions()
    }
}

/// A configured engine. Each `run` call is independent and blocking.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Validate the configuration and build an engine.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Execute a full map/reduce run over `inputs`, blocking until both
    /// phases complete and all engine resources are released.
    ///
    /// The mapper is invoked once per input path, on pool workers, with
    /// inputs scheduled smallest-file-first (unreadable paths count as
    /// empty and go first). After the map barrier, the reducer is invoked
    /// with each partition's current head key until the partition drains;
    /// a reducer must consume at least that key's values through
    /// [`ReduceContext::next_value`], otherwise its reduce job cannot make
    /// progress.
    pub fn run<M, R>(&self, inputs: &[PathBuf], mapper: M, reducer: R) -> EngineResult<()>
    where
        M: Fn(&MapContext<'_>, &Path) + Send + Sync + 'static,
        R: Fn(&ReduceContext<'_>, &[u8], usize) + Send + Sync + 'static,
    {
        let store = Arc::new(PartitionStore::new(self.config.num_partitions)?);
        let pool = ThreadPool::new(self.config.num_workers)?;
        let mapper = Arc::new(mapper);
        let reducer = Arc::new(reducer);

        // Map phase: one job per input, file size as the hint.
        let mut files: Vec<(PathBuf, u64)> = inputs
            .iter()
            .map(|path| {
                let size = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
                (path.clone(), size)
            })
            .collect();
        files.sort_by_key(|&(_, size)| size);
        mrdebug!("map phase: {} jobs", files.len());

        for (path, size) in files {
            let store = Arc::clone(&store);
            let mapper = Arc::clone(&mapper);
            pool.submit(
                move || {
                    let ctx = MapContext { store: &store };
                    (*mapper)(&ctx, &path);
                },
                size,
            )?;
        }
        pool.wait_idle();

        // Reduce phase: one job per partition, byte charge as the hint.
        let mut parts: Vec<(usize, u64)> = (0..store.num_partitions())
            .map(|index| (index, store.bytes(index)))
            .collect();
        parts.sort_by_key(|&(_, bytes)| bytes);
        mrdebug!("reduce phase: {} jobs", parts.len());

        for (index, bytes) in parts {
            let store = Arc::clone(&store);
            let reducer = Arc::clone(&reducer);
            pool.submit(
                move || {
                    mrprint::set_partition_id(index as u32);
                    // Hand the reducer a copy of the head key each pass;
                    // the stored pair and its own key are freed as the
                    // reducer drains it.
                    while let Some(key) = store.head_key(index) {
                        let ctx = ReduceContext { store: &store };
                        (*reducer)(&ctx, &key, index);
                    }
                    mrprint::clear_partition_id();
                },
                bytes,
            )?;
        }
        pool.wait_idle();

        pool.join();
        Ok(())
    }
}

/// One-shot convenience wrapper around [`Engine::run`].
pub fn run<M, R>(
    config: EngineConfig,
    inputs: &[PathBuf],
    mapper: M,
    reducer: R,
) -> EngineResult<()>
where
    M: Fn(&MapContext<'_>, &Path) + Send + Sync + 'static,
    R: Fn(&ReduceContext<'_>, &[u8], usize) + Send + Sync + 'static,
{
    Engine::new(config)?.run(inputs, mapper, reducer)
}
