//! Engine configuration
//!
//! Compile-time defaults with an opt-in environment override for drivers.
//! The engine itself never reads the environment: a run is parameterized
//! entirely by the `EngineConfig` handed to it.
//!
//! # Example
//!
//! ```ignore
//! use mapred_engine::EngineConfig;
//!
//! // Library use: explicit values
//! let config = EngineConfig::default().num_workers(8).num_partitions(16);
//!
//! // Driver use: defaults with MR_* overrides
//! let config = EngineConfig::from_env();
//! ```

use mapred_core::constants;
use mapred_core::env::env_get;
use mapred_core::{EngineError, EngineResult};

/// Engine configuration with builder-style setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of pool worker threads
    pub num_workers: usize,
    /// Number of key-space partitions
    pub num_partitions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_workers: constants::DEFAULT_NUM_WORKERS,
            num_partitions: constants::DEFAULT_NUM_PARTITIONS,
        }
    }
}

impl EngineConfig {
    /// Defaults with environment overrides applied.
    ///
    /// Environment variables (both optional):
    /// - `MR_NUM_WORKERS` - number of pool worker threads
    /// - `MR_NUM_PARTITIONS` - number of key-space partitions
    pub fn from_env() -> Self {
        Self {
            num_workers: env_get("MR_NUM_WORKERS", constants::DEFAULT_NUM_WORKERS),
            num_partitions: env_get("MR_NUM_PARTITIONS", constants::DEFAULT_NUM_PARTITIONS),
        }
    }

    /// Set the number of pool worker threads
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Set the number of key-space partitions
    pub fn num_partitions(mut self, num_partitions: usize) -> Self {
        self.num_partitions = num_partitions;
        self
    }

    /// Reject zero worker or partition counts.
    pub fn validate(&self) -> EngineResult<()> {
        if self.num_workers == 0 {
            return Err(EngineError::NoWorkers);
        }
        if self.num_partitions == 0 {
            return Err(EngineError::NoPartitions);
        }
        Ok(())
    }
}
