//! Buffer pool: a bounded set of fixed-size byte buffers
//!
//! The pool lends [`Buffer`]s to the pipe's writer and reclaims them once
//! the reader has consumed their bytes. Access is guarded by a single
//! mutex; the pool is not on the data hot path.

pub mod buffer;
pub mod config;
pub mod stats;

pub use buffer::Buffer;
pub use config::BufferPoolConfig;
pub use stats::BufferPoolStats;

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{PipeError, Result};

/// A pool of fixed-size buffers with checked-out tracking
#[derive(Debug)]
pub struct BufferPool {
    /// Configuration
    config: BufferPoolConfig,
    /// Free list, checked-out set and statistics
    inner: Mutex<PoolInner>,
}

#[derive(Debug)]
struct PoolInner {
    /// Buffers available for lending
    free: VecDeque<Buffer>,
    /// Ids of buffers currently lent out
    checked_out: HashSet<u64>,
    /// Next buffer id to assign
    next_id: u64,
    /// Activity counters
    stats: BufferPoolStats,
}

impl BufferPool {
    /// Create a pool, pre-allocating `initial_count` buffers
    pub fn new(config: BufferPoolConfig) -> Result<Self> {
        config.validate()?;

        let mut free = VecDeque::with_capacity(config.initial_count);
        for id in 0..config.initial_count as u64 {
            free.push_back(Buffer::new(config.chunk_size, id));
        }

        let stats = BufferPoolStats {
            total_allocated: config.initial_count,
            ..Default::default()
        };

        Ok(Self {
            inner: Mutex::new(PoolInner {
                free,
                checked_out: HashSet::new(),
                next_id: config.initial_count as u64,
                stats,
            }),
            config,
        })
    }

    /// Create a pool with the default configuration
    pub fn with_defaults() -> Self {
        Self::new(BufferPoolConfig::default()).expect("default pool config is valid")
    }

    /// Borrow a buffer from the pool.
    ///
    /// Reuses a free buffer when one is available, otherwise allocates a
    /// new one unless the pool is capped at `max_count` live buffers, in
    /// which case the call fails with
    /// [`PoolExhausted`](PipeError::PoolExhausted). Never blocks.
    pub fn acquire(&self) -> Result<Buffer> {
        let mut inner = self.inner.lock().unwrap();

        let buffer = match inner.free.pop_front() {
            Some(buffer) => buffer,
            None => {
                if let Some(max) = self.config.max_count {
                    if inner.stats.total_allocated >= max {
                        inner.stats.acquire_failures += 1;
                        return Err(PipeError::PoolExhausted { max_count: max });
                    }
                }
                let id = inner.next_id;
                inner.next_id += 1;
                inner.stats.total_allocated += 1;
                debug!(id, chunk_size = self.config.chunk_size, "pool grew by one buffer");
                Buffer::new(self.config.chunk_size, id)
            }
        };

        inner.checked_out.insert(buffer.id());
        inner.stats.total_acquires += 1;
        inner.stats.currently_in_use = inner.checked_out.len();
        inner.stats.peak_usage = inner.stats.peak_usage.max(inner.checked_out.len());

        Ok(buffer)
    }

    /// Return a buffer to the free list.
    ///
    /// The buffer's length is cleared so a later [`acquire`](Self::acquire)
    /// hands it out empty. Fails with
    /// [`DoubleRelease`](PipeError::DoubleRelease) if the buffer is not
    /// currently checked out.
    pub fn release(&self, mut buffer: Buffer) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.checked_out.remove(&buffer.id()) {
            return Err(PipeError::DoubleRelease { id: buffer.id() });
        }

        buffer.clear();
        inner.free.push_back(buffer);
        inner.stats.total_releases += 1;
        inner.stats.currently_in_use = inner.checked_out.len();
        Ok(())
    }

    /// Retire a checked-out buffer whose storage cannot be recovered
    /// because a frozen snapshot still references it. The pool forgets the
    /// buffer and may allocate a replacement within the configured cap.
    pub(crate) fn forfeit(&self, id: u64) {
        let mut inner = self.inner.lock().unwrap();
        if inner.checked_out.remove(&id) {
            inner.stats.total_allocated = inner.stats.total_allocated.saturating_sub(1);
            inner.stats.forfeited += 1;
            inner.stats.currently_in_use = inner.checked_out.len();
        }
    }

    /// Number of buffers currently on the free list
    pub fn available_count(&self) -> usize {
        self.inner.lock().unwrap().free.len()
    }

    /// Number of buffers currently checked out
    pub fn checked_out_count(&self) -> usize {
        self.inner.lock().unwrap().checked_out.len()
    }

    /// Snapshot of the pool statistics
    pub fn stats(&self) -> BufferPoolStats {
        self.inner.lock().unwrap().stats.clone()
    }

    /// Pool configuration
    pub fn config(&self) -> &BufferPoolConfig {
        &self.config
    }
}
