//! Producer half of the pipe

use std::sync::Arc;

use tracing::{debug, trace};

use crate::cancel::CancelToken;
use crate::error::{PipeError, Result};
use crate::pool::{Buffer, BufferPool};

use super::state::{PipeLifecycle, PipeStats};
use super::PipeInner;

/// Producer handle of a [`BytePipe`](super::BytePipe).
///
/// The writer borrows buffers from the pool, fills them through
/// [`reserve`](Self::reserve)/[`commit`](Self::commit), and publishes
/// committed buffers to the reader with [`flush`](Self::flush). Dropping
/// the writer completes it cleanly.
#[derive(Debug)]
pub struct PipeWriter {
    inner: Arc<PipeInner>,
    /// Buffer currently being filled; owned by the writer alone
    current: Option<Buffer>,
    /// Committed buffers not yet visible to the reader
    unflushed: Vec<Buffer>,
    /// complete() was called
    completed: bool,
}

impl PipeWriter {
    pub(crate) fn new(inner: Arc<PipeInner>) -> Self {
        Self {
            inner,
            current: None,
            unflushed: Vec::new(),
            completed: false,
        }
    }

    /// Get a writable span of at least `min(size_hint, chunk_size)` bytes
    /// (at least one byte when the hint is zero), borrowing a fresh pool
    /// buffer when the current one cannot fit that much. A hint larger
    /// than the pool's chunk size is clamped: the caller writes what fits
    /// and reserves again, as buffers are fixed-size.
    ///
    /// Never blocks in the unbounded configuration. With an
    /// outstanding-bytes watermark configured, acquiring a fresh buffer
    /// suspends until the reader advances below the watermark; use
    /// [`reserve_cancellable`](Self::reserve_cancellable) to bound that
    /// wait.
    pub fn reserve(&mut self, size_hint: usize) -> Result<&mut [u8]> {
        self.reserve_inner(size_hint, None)
    }

    /// [`reserve`](Self::reserve) that aborts with
    /// [`Cancelled`](PipeError::Cancelled) when `token` fires
    pub fn reserve_cancellable(
        &mut self,
        size_hint: usize,
        token: &CancelToken,
    ) -> Result<&mut [u8]> {
        self.reserve_inner(size_hint, Some(token))
    }

    fn reserve_inner(&mut self, size_hint: usize, token: Option<&CancelToken>) -> Result<&mut [u8]> {
        if self.completed {
            return Err(PipeError::closed("reserve"));
        }
        if let Some(token) = token {
            if token.is_cancelled() {
                return Err(PipeError::Cancelled);
            }
        }
        self.check_peer_state("reserve")?;

        let chunk_size = self.inner.pool.config().chunk_size;
        let needed = size_hint.max(1).min(chunk_size);

        if self.current.as_ref().map_or(true, |b| b.remaining() < needed) {
            // Retire the current buffer before borrowing a fresh one.
            if let Some(buffer) = self.current.take() {
                if buffer.is_empty() {
                    self.release_to_pool(buffer);
                } else {
                    self.unflushed.push(buffer);
                }
            }
            if let Some(limit) = self.inner.config.outstanding_limit {
                self.wait_below_watermark(limit, token, "reserve")?;
            }
            self.current = Some(self.inner.pool.acquire()?);
        }

        let buffer = self.current.as_mut().expect("reserve leaves a writable buffer");
        Ok(buffer.spare_mut())
    }

    /// Mark `bytes_written` bytes of the reserved span as valid. A buffer
    /// that becomes full is queued for the next flush immediately. Fails
    /// once the pipe has faulted or the reader has closed its side.
    pub fn commit(&mut self, bytes_written: usize) -> Result<()> {
        if self.completed {
            return Err(PipeError::closed("commit"));
        }
        self.check_peer_state("commit")?;
        let buffer = self.current.as_mut().ok_or_else(|| {
            PipeError::invalid_parameter("bytes_written", "commit without a reserved buffer")
        })?;
        buffer.advance(bytes_written)?;
        if buffer.is_full() {
            if let Some(full) = self.current.take() {
                self.unflushed.push(full);
            }
        }
        Ok(())
    }

    /// Make every committed byte visible to the reader and wake it.
    ///
    /// A partially filled current buffer is sealed and published as well,
    /// so flushed data never lingers in the writer. With an
    /// outstanding-bytes watermark configured, suspends after publishing
    /// until the reader consumes below the watermark.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_inner(None)
    }

    /// [`flush`](Self::flush) that aborts with
    /// [`Cancelled`](PipeError::Cancelled) when `token` fires
    pub fn flush_cancellable(&mut self, token: &CancelToken) -> Result<()> {
        self.flush_inner(Some(token))
    }

    fn flush_inner(&mut self, token: Option<&CancelToken>) -> Result<()> {
        if self.completed {
            return Err(PipeError::closed("flush"));
        }
        if let Some(token) = token {
            if token.is_cancelled() {
                return Err(PipeError::Cancelled);
            }
        }

        if let Some(buffer) = self.current.take() {
            if buffer.is_empty() {
                self.current = Some(buffer);
            } else {
                self.unflushed.push(buffer);
            }
        }

        {
            let mut shared = self.inner.shared.lock().unwrap();
            if let Some(fault) = &shared.fault {
                return Err(fault.clone());
            }
            if shared.reader_done {
                return Err(PipeError::closed("flush"));
            }

            let mut published = 0u64;
            for buffer in self.unflushed.drain(..) {
                published += buffer.len() as u64;
                shared.queued.push_back(buffer.freeze());
            }
            if published > 0 {
                shared.flushed_end += published;
                shared.stats.bytes_flushed += published;
                shared.stats.flushes += 1;
                self.inner.cond.notify_all();
            }
            trace!(published, outstanding = shared.outstanding(), "flush");
        }

        if let Some(limit) = self.inner.config.outstanding_limit {
            self.wait_below_watermark(limit, token, "flush")?;
        }
        Ok(())
    }

    /// Close the producer side.
    ///
    /// With no error, remaining committed bytes are published first and
    /// the pipe transitions to `WriterClosed`. With an error, pending
    /// buffers are returned to the pool and the pipe faults; the reader's
    /// next operation surfaces the error. Further producer operations fail
    /// with [`PipeClosed`](PipeError::PipeClosed).
    pub fn complete(&mut self, error: Option<PipeError>) -> Result<()> {
        if self.completed {
            return Err(PipeError::closed("complete"));
        }
        self.completed = true;

        let mut shared = self.inner.shared.lock().unwrap();
        let prior_fault = shared.fault.clone();
        let reporting_error = error.is_some();
        match error {
            None if shared.fault.is_none() && !shared.reader_done => {
                if let Some(buffer) = self.current.take() {
                    if buffer.is_empty() {
                        drop(shared);
                        self.release_to_pool(buffer);
                        shared = self.inner.shared.lock().unwrap();
                    } else {
                        self.unflushed.push(buffer);
                    }
                }
                let mut published = 0u64;
                for buffer in self.unflushed.drain(..) {
                    published += buffer.len() as u64;
                    shared.queued.push_back(buffer.freeze());
                }
                shared.flushed_end += published;
                shared.stats.bytes_flushed += published;
                shared.writer_done = true;
                debug!(published, "writer completed");
            }
            _ => {
                // Faulting, or the peer is already gone: nothing more will
                // be read, so reclaim pending buffers instead of queueing.
                let pending: Vec<Buffer> =
                    self.current.take().into_iter().chain(self.unflushed.drain(..)).collect();
                drop(shared);
                for buffer in pending {
                    self.release_to_pool(buffer);
                }
                shared = self.inner.shared.lock().unwrap();
                shared.writer_done = true;
                if let Some(error) = error {
                    debug!(%error, "writer completed with error");
                    if shared.fault.is_none() {
                        shared.fault = Some(error);
                    }
                }
            }
        }
        self.inner.cond.notify_all();
        drop(shared);

        // A clean complete on an already-faulted pipe surfaces the peer's
        // error; completing with an error is itself successful reporting.
        match prior_fault {
            Some(fault) if !reporting_error => Err(fault),
            _ => Ok(()),
        }
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

    fn check_peer_state(&self, context: &'static str) -> Result<()> {
        let shared = self.inner.shared.lock().unwrap();
        if let Some(fault) = &shared.fault {
            return Err(fault.clone());
        }
        if shared.reader_done {
            return Err(PipeError::closed(context));
        }
        Ok(())
    }

    /// Block until flushed-unconsumed bytes drop to the watermark
    fn wait_below_watermark(
        &self,
        limit: usize,
        token: Option<&CancelToken>,
        context: &'static str,
    ) -> Result<()> {
        let mut shared = self.inner.shared.lock().unwrap();
        let _registration = token.map(|t| t.register(&self.inner.cond));
        while shared.outstanding() > limit as u64 {
            if let Some(token) = token {
                if token.is_cancelled() {
                    return Err(PipeError::Cancelled);
                }
            }
            if let Some(fault) = &shared.fault {
                return Err(fault.clone());
            }
            if shared.reader_done {
                return Err(PipeError::closed(context));
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
        Ok(())
    }

    fn release_to_pool(&self, buffer: Buffer) {
        let _ = self.inner.pool.release(buffer);
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        if !self.completed {
            let _ = self.complete(None);
        }
    }
}
