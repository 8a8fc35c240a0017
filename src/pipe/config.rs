//! Pipe configuration

use serde::{Deserialize, Serialize};

use crate::error::{PipeError, Result};
use crate::pool::BufferPoolConfig;

/// Configuration for a [`BytePipe`](crate::pipe::BytePipe)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeConfig {
    /// Buffer pool backing the pipe
    pub pool: BufferPoolConfig,
    /// Maximum flushed-but-unconsumed bytes before `reserve`/`flush`
    /// suspend until the reader advances. `None` means unbounded: buffers
    /// accumulate if the reader is slow.
    pub outstanding_limit: Option<usize>,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            pool: BufferPoolConfig::default(),
            outstanding_limit: None,
        }
    }
}

impl PipeConfig {
    /// Create a configuration with defaults (unbounded, 4 KiB chunks)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the buffer pool configuration
    pub fn with_pool(mut self, pool: BufferPoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Convenience setter for the pool's chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.pool.chunk_size = chunk_size;
        self
    }

    /// Enable the bounded variant: producer operations suspend while more
    /// than `bytes` flushed bytes remain unconsumed
    pub fn with_outstanding_limit(mut self, bytes: usize) -> Self {
        self.outstanding_limit = Some(bytes);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.pool.validate()?;
        if self.outstanding_limit == Some(0) {
            return Err(PipeError::invalid_parameter(
                "outstanding_limit",
                "outstanding-bytes watermark cannot be zero",
            ));
        }
        Ok(())
    }
}
