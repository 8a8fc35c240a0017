//! Fixed-capacity byte buffer lent out by the pool

use std::sync::Arc;

use crate::error::{PipeError, Result};

/// A fixed-capacity, contiguous byte buffer with a valid-data length.
///
/// A buffer is owned exclusively by whichever party currently holds it:
/// the pool's free list, the writer filling it, or the pipe's queue of
/// flushed data (frozen behind an [`Arc`] at that point). Ownership moves
/// between those parties; it is never shared mutably.
#[derive(Debug)]
pub struct Buffer {
    /// Backing storage, allocated once at the pool's chunk size
    storage: Box<[u8]>,
    /// Number of valid bytes written so far
    len: usize,
    /// Stable identifier for checked-out tracking
    id: u64,
}

impl Buffer {
    /// Allocate a new zeroed buffer. Only the pool creates buffers.
    pub(crate) fn new(capacity: usize, id: u64) -> Self {
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
            id,
        }
    }

    /// Total capacity in bytes
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of valid bytes written so far
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no valid bytes have been written
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the buffer has no spare capacity left
    pub fn is_full(&self) -> bool {
        self.len == self.storage.len()
    }

    /// Spare capacity in bytes
    pub fn remaining(&self) -> usize {
        self.storage.len() - self.len
    }

    /// Stable identifier assigned by the pool
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The valid bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    /// The writable span past the valid bytes
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.len..]
    }

    /// Mark `n` more bytes as valid after they were written into
    /// [`spare_mut`](Self::spare_mut).
    pub fn advance(&mut self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(PipeError::invalid_parameter(
                "bytes_written",
                format!("advance of {} exceeds spare capacity {}", n, self.remaining()),
            ));
        }
        self.len += n;
        Ok(())
    }

    /// Reset the valid length to zero. The pool clears buffers on release
    /// so a reused buffer never exposes stale bytes.
    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }

    /// Freeze the buffer into an immutable, shareable snapshot.
    ///
    /// Frozen buffers back [`Segment`](crate::sequence::Segment)s; the pipe
    /// recovers unique ownership via `Arc::try_unwrap` when the reader has
    /// dropped its views.
    pub fn freeze(self) -> Arc<Buffer> {
        Arc::new(self)
    }
}
