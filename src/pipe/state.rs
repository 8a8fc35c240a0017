//! Shared pipe state and lifecycle tracking

use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::PipeError;
use crate::pool::Buffer;

/// Lifecycle of a pipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeLifecycle {
    /// Both ends active
    Open,
    /// Writer signalled completion; unread data may remain
    WriterClosed,
    /// Writer closed and all data consumed; terminal
    Drained,
    /// Either side reported an error; terminal, overrides the others
    Faulted,
}

/// Counters describing pipe activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipeStats {
    /// Bytes made visible to the reader by flushes
    pub bytes_flushed: u64,
    /// Bytes the reader has marked consumed
    pub bytes_consumed: u64,
    /// Number of flush calls that published data
    pub flushes: u64,
    /// Number of read snapshots handed out
    pub reads: u64,
}

/// State shared between the two pipe handles, guarded by one mutex.
///
/// Invariant: `queued_base <= consumed <= examined <= flushed_end`, and
/// `flushed_end - queued_base` equals the sum of queued buffer lengths.
#[derive(Debug)]
pub(crate) struct PipeShared {
    /// Flushed buffers not yet fully consumed, oldest first
    pub queued: VecDeque<Arc<Buffer>>,
    /// Stream offset of the first byte of the oldest queued buffer
    pub queued_base: u64,
    /// Stream offset one past the last flushed byte
    pub flushed_end: u64,
    /// Offset below which buffers may be reclaimed
    pub consumed: u64,
    /// Offset up to which the reader has inspected data
    pub examined: u64,
    /// Writer called complete
    pub writer_done: bool,
    /// Reader called complete
    pub reader_done: bool,
    /// First error reported by either side
    pub fault: Option<PipeError>,
    /// Activity counters
    pub stats: PipeStats,
}

impl PipeShared {
    pub(crate) fn new() -> Self {
        Self {
            queued: VecDeque::new(),
            queued_base: 0,
            flushed_end: 0,
            consumed: 0,
            examined: 0,
            writer_done: false,
            reader_done: false,
            fault: None,
            stats: PipeStats::default(),
        }
    }

    /// Flushed bytes the reader has not yet consumed
    pub(crate) fn outstanding(&self) -> u64 {
        self.flushed_end - self.consumed
    }

    pub(crate) fn lifecycle(&self) -> PipeLifecycle {
        if self.fault.is_some() {
            PipeLifecycle::Faulted
        } else if self.writer_done && self.reader_done {
            PipeLifecycle::Drained
        } else if self.writer_done {
            PipeLifecycle::WriterClosed
        } else {
            PipeLifecycle::Open
        }
    }
}
