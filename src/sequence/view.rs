//! Read-only window over a segment chain

use crate::error::{PipeError, Result};

use super::segment::Segment;

/// A read-only window over an ordered chain of segments.
///
/// Iterating the view yields the segments' byte slices in running-index
/// order with no gaps or overlaps. Views are built once per snapshot and
/// never mutated; a new snapshot gets a new view.
#[derive(Debug, Clone)]
pub struct SequenceView {
    /// Segments in running-index order
    segments: Vec<Segment>,
    /// Logical offset of the first byte in the view
    start_position: u64,
    /// Logical offset one past the last byte in the view
    end_position: u64,
}

impl SequenceView {
    pub(crate) fn new(segments: Vec<Segment>, start_position: u64, end_position: u64) -> Self {
        debug_assert!(start_position <= end_position);
        Self {
            segments,
            start_position,
            end_position,
        }
    }

    /// Logical offset of the first byte in the view
    pub fn start_position(&self) -> u64 {
        self.start_position
    }

    /// Logical offset one past the last byte in the view
    pub fn end_position(&self) -> u64 {
        self.end_position
    }

    /// Number of bytes in the view
    pub fn len(&self) -> usize {
        (self.end_position - self.start_position) as usize
    }

    /// Whether the view holds no bytes
    pub fn is_empty(&self) -> bool {
        self.start_position == self.end_position
    }

    /// The segments in running-index order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterate the view's byte slices in order
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.segments.iter().map(Segment::bytes)
    }

    /// Resolve the byte at logical offset `position`, or `None` if the
    /// offset lies outside the view. A given offset always resolves to the
    /// same source byte no matter how many buffers the view spans.
    pub fn byte_at(&self, position: u64) -> Option<u8> {
        if position < self.start_position || position >= self.end_position {
            return None;
        }
        let idx = self
            .segments
            .partition_point(|segment| segment.end_index() <= position);
        let segment = &self.segments[idx];
        Some(segment.bytes()[(position - segment.running_index()) as usize])
    }

    /// Copy every byte in the view into `destination` in order.
    ///
    /// Returns the number of bytes copied. Fails with
    /// [`DestinationTooSmall`](PipeError::DestinationTooSmall) when the
    /// destination cannot hold the whole view.
    pub fn copy_to(&self, destination: &mut [u8]) -> Result<usize> {
        let required = self.len();
        if destination.len() < required {
            return Err(PipeError::DestinationTooSmall {
                required,
                available: destination.len(),
            });
        }

        let mut offset = 0;
        for segment in &self.segments {
            let bytes = segment.bytes();
            destination[offset..offset + bytes.len()].copy_from_slice(bytes);
            offset += bytes.len();
        }
        Ok(offset)
    }
}
