//! Shortest-job-first worker pool
//!
//! A fixed set of OS worker threads sharing one size-ordered job queue.
//!
//! Design:
//! - one mutex guards the queue, the stop flag, and `active_workers`
//! - `has_job` wakes a single worker per submitted job
//! - `all_idle` is broadcast when the queue drains and the last busy worker
//!   returns to idle; `wait_idle` is the phase barrier built on it
//! - user jobs always run with the pool lock released
//!
//! `active_workers` is released by a drop guard, so the barrier stays
//! correct even when a job panics. The panic itself still unwinds its
//! worker thread; the pool does not catch panics or respawn workers.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use mapred_core::{mrprint, mrtrace, mrwarn, EngineError, EngineResult};

use crate::queue::SjfQueue;

/// Fixed-size worker pool executing jobs smallest-hint-first.
pub struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

struct PoolShared {
    state: Mutex<PoolState>,
    has_job: Condvar,
    all_idle: Condvar,
}

struct PoolState {
    queue: SjfQueue,
    /// Threads that have dequeued a job and not yet returned to idle
    active_workers: usize,
    stop: bool,
}

impl ThreadPool {
    /// Create a pool of `num_workers` threads.
    ///
    /// Returns `NoWorkers` for a zero count. If the OS refuses a thread,
    /// the workers that did start are stopped and joined before
    /// `SpawnFailed` is returned.
    pub fn new(num_workers: usize) -> EngineResult<Self> {
        if num_workers == 0 {
            return Err(EngineError::NoWorkers);
        }

        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                queue: SjfQueue::new(),
                active_workers: 0,
                stop: false,
            }),
            has_job: Condvar::new(),
            all_idle: Condvar::new(),
        });

        let mut workers = Vec::with_capacity(num_workers);
        for id in 0..num_workers {
            let worker_shared = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name(format!("mapred-worker-{}", id))
                .spawn(move || worker_loop(id, worker_shared));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(_) => {
                    let mut partial = Self { shared, workers };
                    partial.halt_and_join();
                    return Err(EngineError::SpawnFailed);
                }
            }
        }

        Ok(Self { shared, workers })
    }

    /// Number of worker threads.
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Enqueue a job with a byte-size hint and wake one worker.
    ///
    /// Fails with `PoolStopped` once shutdown has begun.
    pub fn submit<F>(&self, job: F, size_hint: u64) -> EngineResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.state.lock().unwrap();
        if state.stop {
            return Err(EngineError::PoolStopped);
        }
        state.queue.push(Box::new(job), size_hint);
        self.shared.has_job.notify_one();
        Ok(())
    }

    /// Block until the queue is empty and no worker is executing a job.
    ///
    /// Returns immediately when the pool is already idle. Every job
    /// submitted before this call has finished by the time it returns.
    /// May be called any number of times over the pool's lifetime.
    pub fn wait_idle(&self) {
        let mut state = self.shared.state.lock().unwrap();
        while !state.queue.is_empty() || state.active_workers > 0 {
            state = self.shared.all_idle.wait(state).unwrap();
        }
    }

    /// Begin shutdown: refuse new jobs and wake every idle worker.
    ///
    /// Already-queued jobs still drain before the workers exit.
    pub fn shutdown(&self) {
        let mut state = self.shared.state.lock().unwrap();
        state.stop = true;
        self.shared.has_job.notify_all();
    }

    /// Shut down and join every worker thread.
    pub fn join(mut self) {
        self.halt_and_join();
    }

    fn halt_and_join(&mut self) {
        self.shutdown();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        // Workers drain the queue before exiting, so anything left here
        // belonged to workers that died mid-run.
        let mut state = self.shared.state.lock().unwrap();
        if !state.queue.is_empty() {
            mrwarn!("discarding {} queued jobs", state.queue.len());
            while state.queue.pop().is_some() {}
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.halt_and_join();
    }
}

fn worker_loop(id: usize, shared: Arc<PoolShared>) {
    mrprint::set_worker_id(id as u32);
    mrtrace!("worker started");

    loop {
        let mut state = shared.state.lock().unwrap();
        while state.queue.is_empty() && !state.stop {
            state = shared.has_job.wait(state).unwrap();
        }
        if state.stop && state.queue.is_empty() {
            break;
        }
        let job = match state.queue.pop() {
            Some(job) => job,
            None => continue,
        };
        state.active_workers += 1;
        drop(state);

        // Decremented on every exit path, including a panicking job.
        let _active = ActiveGuard { shared: &shared };
        mrtrace!("running job (size hint {})", job.size);
        (job.task)();
    }

    mrtrace!("worker exiting");
    mrprint::clear_worker_id();
}

struct ActiveGuard<'a> {
    shared: &'a PoolShared,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock().unwrap();
        state.active_workers -= 1;
        if state.queue.is_empty() && state.active_workers == 0 {
            self.shared.all_idle.notify_all();
        }
    }
}
