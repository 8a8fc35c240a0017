//! Buffer pool configuration

use serde::{Deserialize, Serialize};

use crate::error::{PipeError, Result};

/// Configuration for a [`BufferPool`](crate::pool::BufferPool)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferPoolConfig {
    /// Size of each buffer in bytes
    pub chunk_size: usize,
    /// Number of buffers allocated up front
    pub initial_count: usize,
    /// Maximum number of live buffers; `None` lets the pool grow on demand
    pub max_count: Option<usize>,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4096,
            initial_count: 16,
            max_count: None,
        }
    }
}

impl BufferPoolConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-buffer chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the number of buffers allocated up front
    pub fn with_initial_count(mut self, count: usize) -> Self {
        self.initial_count = count;
        self
    }

    /// Cap the pool at a fixed buffer count; acquire fails with
    /// [`PoolExhausted`](crate::PipeError::PoolExhausted) once every buffer
    /// is checked out
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Remove the buffer-count cap, letting the pool allocate on demand
    pub fn with_unbounded_growth(mut self) -> Self {
        self.max_count = None;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(PipeError::invalid_parameter(
                "chunk_size",
                "chunk size cannot be zero",
            ));
        }
        if let Some(max) = self.max_count {
            if max == 0 {
                return Err(PipeError::invalid_parameter(
                    "max_count",
                    "maximum buffer count cannot be zero",
                ));
            }
            if self.initial_count > max {
                return Err(PipeError::invalid_parameter(
                    "initial_count",
                    format!("initial count {} exceeds maximum {}", self.initial_count, max),
                ));
            }
        }
        Ok(())
    }
}
