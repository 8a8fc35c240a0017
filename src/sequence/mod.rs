//! Zero-copy logical sequences over discontiguous buffers
//!
//! A [`SegmentChain`] stitches an ordered set of frozen buffers into one
//! logical byte stream. Each [`Segment`] carries a running index (the
//! cumulative offset of its first byte) so a consumer can address any
//! logical position without concatenating buffers. Chains are stored as a
//! flat segment list with precomputed offsets rather than a linked object
//! graph, which keeps ownership simple.

pub mod segment;
pub mod view;

pub use segment::Segment;
pub use view::SequenceView;

use std::sync::Arc;

use crate::pool::Buffer;

/// Builder for immutable sequence views
#[derive(Debug)]
pub struct SegmentChain;

impl SegmentChain {
    /// Build a view over `buffers` in order, with logical position 0 at
    /// the first byte of the first buffer.
    ///
    /// Handles the zero-buffer case (an empty view with start == end) and
    /// buffers of unequal fill; buffers with no valid bytes contribute no
    /// segment.
    pub fn build<I>(buffers: I) -> SequenceView
    where
        I: IntoIterator<Item = Arc<Buffer>>,
    {
        Self::build_window(buffers, 0, 0)
    }

    /// Build a view whose running indices start at `base` (the logical
    /// offset of the first buffer's first byte) and whose window begins at
    /// `start >= base`, trimming any leading bytes below it. The pipe uses
    /// this to snapshot its queue at the reader's consumed position.
    pub(crate) fn build_window<I>(buffers: I, base: u64, start: u64) -> SequenceView
    where
        I: IntoIterator<Item = Arc<Buffer>>,
    {
        let mut segments = Vec::new();
        let mut running = base;

        for buffer in buffers {
            let len = buffer.len() as u64;
            if len == 0 {
                continue;
            }
            let buffer_start = running;
            running += len;
            if running <= start {
                continue;
            }
            let skip = start.saturating_sub(buffer_start) as usize;
            segments.push(Segment::new(
                Arc::clone(&buffer),
                skip,
                buffer.len(),
                buffer_start + skip as u64,
            ));
        }

        let start_position = match segments.first() {
            Some(first) => first.running_index(),
            None => running.max(start),
        };
        SequenceView::new(segments, start_position, running.max(start))
    }
}
