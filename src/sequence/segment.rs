//! One node of a segment chain

use std::sync::Arc;

use crate::pool::Buffer;

/// An immutable slice of one frozen buffer's valid bytes, tagged with its
/// running index: the cumulative logical offset of its first byte within
/// the whole chain.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Frozen buffer backing this segment
    data: Arc<Buffer>,
    /// Start of the slice within the buffer's valid bytes
    start: usize,
    /// End of the slice (exclusive)
    end: usize,
    /// Logical offset of the slice's first byte
    running_index: u64,
}

impl Segment {
    pub(crate) fn new(data: Arc<Buffer>, start: usize, end: usize, running_index: u64) -> Self {
        debug_assert!(start <= end && end <= data.len());
        Self {
            data,
            start,
            end,
            running_index,
        }
    }

    /// The segment's bytes
    pub fn bytes(&self) -> &[u8] {
        &self.data.as_slice()[self.start..self.end]
    }

    /// Number of bytes in the segment
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the segment holds no bytes
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Logical offset of the segment's first byte within the chain
    pub fn running_index(&self) -> u64 {
        self.running_index
    }

    /// Logical offset one past the segment's last byte
    pub fn end_index(&self) -> u64 {
        self.running_index + self.len() as u64
    }
}
