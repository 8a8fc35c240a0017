//! Buffer pool statistics tracking

/// Snapshot of buffer pool activity for monitoring and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferPoolStats {
    /// Total number of buffers ever allocated
    pub total_allocated: usize,
    /// Number of buffers currently checked out
    pub currently_in_use: usize,
    /// Peak number of buffers checked out simultaneously
    pub peak_usage: usize,
    /// Total number of successful acquires
    pub total_acquires: u64,
    /// Total number of releases back to the free list
    pub total_releases: u64,
    /// Number of acquire failures (pool exhausted)
    pub acquire_failures: u64,
    /// Buffers whose storage could not be reclaimed because a snapshot
    /// still referenced them when they were retired
    pub forfeited: u64,
}

impl BufferPoolStats {
    /// Create a fresh statistics instance
    pub fn new() -> Self {
        Default::default()
    }

    /// Acquire success rate (0.0 to 1.0)
    pub fn success_rate(&self) -> f64 {
        let attempts = self.total_acquires + self.acquire_failures;
        if attempts == 0 {
            return 1.0;
        }
        self.total_acquires as f64 / attempts as f64
    }

    /// Fraction of allocated buffers currently checked out (0.0 to 1.0)
    pub fn utilization(&self) -> f64 {
        if self.total_allocated == 0 {
            return 0.0;
        }
        self.currently_in_use as f64 / self.total_allocated as f64
    }
}
