//! Error types for the mapred engine

use core::fmt;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while building or driving the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// A pool was requested with zero workers
    NoWorkers,

    /// A partition store was requested with zero partitions
    NoPartitions,

    /// A job was submitted after pool shutdown began
    PoolStopped,

    /// A worker thread could not be spawned
    SpawnFailed,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NoWorkers => write!(f, "worker count must be at least 1"),
            EngineError::NoPartitions => write!(f, "partition count must be at least 1"),
            EngineError::PoolStopped => write!(f, "pool is shutting down"),
            EngineError::SpawnFailed => write!(f, "failed to spawn worker thread"),
        }
    }
}

impl std::error::Error for EngineError {}
