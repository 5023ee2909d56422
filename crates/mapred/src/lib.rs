//! # mapred - in-process MapReduce
//!
//! A small MapReduce engine for a single process: hand it input files and a
//! pair of callbacks, and it shards emitted pairs across key-sorted
//! partitions while a shortest-job-first worker pool runs the map phase,
//! then the reduce phase, each behind a barrier.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mapred::{run, EngineConfig, MapContext, ReduceContext};
//! use std::path::{Path, PathBuf};
//!
//! fn main() {
//!     let inputs: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
//!
//!     run(
//!         EngineConfig::default().num_workers(4).num_partitions(8),
//!         &inputs,
//!         |ctx: &MapContext, path: &Path| {
//!             let text = std::fs::read_to_string(path).unwrap_or_default();
//!             for word in text.split_whitespace() {
//!                 ctx.emit(word, "1");
//!             }
//!         },
//!         |ctx: &ReduceContext, key: &[u8], partition: usize| {
//!             let mut count = 0;
//!             while ctx.next_value(key, partition).is_some() {
//!                 count += 1;
//!             }
//!             println!("{}: {}", String::from_utf8_lossy(key), count);
//!         },
//!     )
//!     .expect("run failed");
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      User Callbacks                         │
//! │            map(ctx, path)      reduce(ctx, key, p)          │
//! └─────────────────────────────────────────────────────────────┘
//!              │ emit(k, v)                 │ next_value(k, p)
//!              ▼                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Partition Store                         │
//! │        P locked buckets, key-sorted, byte-charged           │
//! └─────────────────────────────────────────────────────────────┘
//!              ▲                            ▲
//!              │ map jobs                   │ reduce jobs
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SJF Worker Pool                          │
//! │   size-ordered queue, has_job / all_idle, W OS threads      │
//! └─────────────────────────────────────────────────────────────┘
//!              ▲
//!              │ submit, wait_idle (map barrier, reduce barrier)
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Coordinator                            │
//! │   size inputs → map → barrier → reduce by charge → barrier  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys with equal bytes always land in the same partition via the fixed
//! djb2 partitioner ([`default_partitioner`]), so a reducer can rebuild
//! per-partition output paths deterministically.

// Re-export core types
pub use mapred_core::{default_partitioner, EngineError, EngineResult, Pair};

// Re-export mrprint macros for debug logging
pub use mapred_core::{mrdebug, mrerror, mrinfo, mrlog, mrtrace, mrwarn};
pub use mapred_core::mrprint::{init as init_logging, set_log_level, LogLevel};

// Re-export env utilities
pub use mapred_core::{env_get, env_get_bool, env_get_opt};

// Re-export engine types
pub use mapred_engine::{run, Engine, EngineConfig, MapContext, PartitionStore, ReduceContext, ThreadPool};
