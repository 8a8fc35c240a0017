//! Consumer half of the pipe

use std::sync::Arc;

use tracing::{debug, trace};

use crate::cancel::CancelToken;
use crate::error::{PipeError, Result};
use crate::pool::BufferPool;
use crate::sequence::{SegmentChain, SequenceView};

use super::state::{PipeLifecycle, PipeStats};
use super::PipeInner;

/// One read snapshot: a cumulative view over every flushed byte the
/// reader has not yet consumed, plus whether the writer has completed.
#[derive(Debug, Clone)]
pub struct ReadResult {
    /// Zero-copy view of the queued bytes, oldest first
    pub view: SequenceView,
    /// The writer has completed; once this is true and the view is empty,
    /// the reader should call [`PipeReader::complete`]
    pub completed: bool,
}

/// Consumer handle of a [`BytePipe`](super::BytePipe).
///
/// [`read`](Self::read) suspends until flushed data exists past the
/// examined position or the writer closes; [`advance_to`](Self::advance_to)
/// reclaims fully-consumed buffers and records how far the reader has
/// looked ahead. Dropping the reader completes it.
#[derive(Debug)]
pub struct PipeReader {
    inner: Arc<PipeInner>,
    /// complete() was called
    completed: bool,
}

impl PipeReader {
    pub(crate) fn new(inner: Arc<PipeInner>) -> Self {
        Self {
            inner,
            completed: false,
        }
    }

    /// Await the next snapshot.
    ///
    /// Suspends while no flushed data exists past the examined position
    /// and the writer is still open. The returned view is cumulative: it
    /// covers every queued byte from the consumed position to the last
    /// flush, not just the delta since the previous read.
    pub fn read(&mut self) -> Result<ReadResult> {
        self.read_inner(None)
    }

    /// [`read`](Self::read) that aborts with
    /// [`Cancelled`](PipeError::Cancelled) when `token` fires
    pub fn read_cancellable(&mut self, token: &CancelToken) -> Result<ReadResult> {
        self.read_inner(Some(token))
    }

    fn read_inner(&mut self, token: Option<&CancelToken>) -> Result<ReadResult> {
        if self.completed {
            return Err(PipeError::closed("read"));
        }

        let mut shared = self.inner.shared.lock().unwrap();
        let _registration = token.map(|t| t.register(&self.inner.cond));
        loop {
            if let Some(token) = token {
                if token.is_cancelled() {
                    return Err(PipeError::Cancelled);
                }
            }
            if let Some(fault) = &shared.fault {
                return Err(fault.clone());
            }
            if shared.flushed_end > shared.examined || shared.writer_done {
                break;
            }
            // Timed wait when cancellable: a cancel landing between the
            // flag check and the wait would otherwise miss its wakeup.
            shared = match token {
                Some(_) => {
                    self.inner.cond.wait_timeout(shared, super::CANCEL_RECHECK_INTERVAL).unwrap().0
                }
                None => self.inner.cond.wait(shared).unwrap(),
            };
        }

        let view = SegmentChain::build_window(
            shared.queued.iter().map(Arc::clone),
            shared.queued_base,
            shared.consumed,
        );
        shared.stats.reads += 1;
        trace!(
            start = view.start_position(),
            end = view.end_position(),
            completed = shared.writer_done,
            "read snapshot"
        );
        Ok(ReadResult {
            view,
            completed: shared.writer_done,
        })
    }

    /// Report progress: release every buffer wholly below `consumed` back
    /// to the pool and record `examined` as the look-ahead point.
    ///
    /// Subsequent [`read`](Self::read) calls suspend until data arrives
    /// past `examined`, not merely past `consumed`, so a consumer can
    /// inspect an incomplete message without discarding it. Cursors never
    /// move backward, `examined` never drops below `consumed`, and
    /// neither may pass the flushed end; violations fail with
    /// [`InvalidAdvance`](PipeError::InvalidAdvance) and fault the pipe.
    pub fn advance_to(&mut self, consumed: u64, examined: u64) -> Result<()> {
        if self.completed {
            return Err(PipeError::closed("advance_to"));
        }

        let mut shared = self.inner.shared.lock().unwrap();
        if let Some(fault) = &shared.fault {
            return Err(fault.clone());
        }

        let violation = if examined < consumed {
            Some("examined position behind consumed position")
        } else if consumed < shared.consumed {
            Some("consumed position moved backward")
        } else if examined < shared.examined {
            Some("examined position moved backward")
        } else if examined > shared.flushed_end {
            Some("examined position past available data")
        } else {
            None
        };
        if let Some(message) = violation {
            let error = PipeError::InvalidAdvance {
                consumed,
                examined,
                message,
            };
            shared.fault = Some(error.clone());
            self.inner.cond.notify_all();
            return Err(error);
        }

        let newly_consumed = consumed - shared.consumed;
        shared.stats.bytes_consumed += newly_consumed;
        shared.consumed = consumed;
        shared.examined = examined;

        let mut released = 0usize;
        loop {
            let front_end = match shared.queued.front() {
                Some(front) => shared.queued_base + front.len() as u64,
                None => break,
            };
            if front_end > consumed {
                break;
            }
            if let Some(buffer) = shared.queued.pop_front() {
                shared.queued_base = front_end;
                self.inner.release_frozen(buffer);
                released += 1;
            }
        }

        trace!(consumed, examined, released, "reader advanced");
        // Wake a writer suspended on the outstanding-bytes watermark.
        self.inner.cond.notify_all();
        Ok(())
    }

    /// Close the consumer side, reclaiming any still-queued buffers.
    ///
    /// Transitions the pipe to `Drained` when the writer has completed.
    /// Further operations on either side fail with
    /// [`PipeClosed`](PipeError::PipeClosed).
    pub fn complete(&mut self) -> Result<()> {
        if self.completed {
            return Err(PipeError::closed("complete"));
        }
        self.completed = true;

        let mut shared = self.inner.shared.lock().unwrap();
        shared.reader_done = true;
        while let Some(buffer) = shared.queued.pop_front() {
            shared.queued_base += buffer.len() as u64;
            self.inner.release_frozen(buffer);
        }
        self.inner.cond.notify_all();
        debug!(lifecycle = ?shared.lifecycle(), "reader completed");
        Ok(())
    }

    /// Current pipe lifecycle
    pub fn lifecycle(&self) -> PipeLifecycle {
        self.inner.shared.lock().unwrap().lifecycle()
    }

    /// Snapshot of pipe activity counters
    pub fn stats(&self) -> PipeStats {
        self.inner.shared.lock().unwrap().stats.clone()
    }

    /// The pool backing this pipe
    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.inner.pool
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        if !self.completed {
            let _ = self.complete();
        }
    }
}
