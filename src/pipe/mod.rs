//! Single-producer/single-consumer byte pipe
//!
//! A [`BytePipe`] moves bytes from one writer to one reader through a
//! bounded pool of fixed-size buffers. The writer fills pooled buffers
//! via `reserve`/`commit` and publishes them with `flush`; the reader
//! takes zero-copy [`SequenceView`](crate::sequence::SequenceView)
//! snapshots with `read` and reclaims buffers with `advance_to`, keeping
//! separate consumed and examined cursors so it can look ahead without
//! discarding data.
//!
//! `read` is the only suspension point in the default unbounded
//! configuration; with an outstanding-bytes watermark configured,
//! `reserve` and `flush` also suspend until the reader catches up. All
//! suspension points accept a [`CancelToken`](crate::cancel::CancelToken).

pub mod config;
pub mod reader;
pub mod state;
pub mod writer;

pub use config::PipeConfig;
pub use reader::{PipeReader, ReadResult};
pub use state::{PipeLifecycle, PipeStats};
pub use writer::PipeWriter;

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;
use crate::pool::{Buffer, BufferPool};
use state::PipeShared;

/// Re-check interval for cancellable waits. Token registration wakes a
/// suspended side promptly; the timed wait bounds the window where a
/// cancel fires before the waiter has parked on the condvar.
pub(crate) const CANCEL_RECHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Shared core of a pipe, owned jointly by the two handles
#[derive(Debug)]
pub(crate) struct PipeInner {
    /// Queue metadata and cursors
    pub(crate) shared: Mutex<PipeShared>,
    /// Wakes whichever side is suspended
    pub(crate) cond: Arc<Condvar>,
    /// Pool the writer borrows buffers from and the reader reclaims into
    pub(crate) pool: Arc<BufferPool>,
    /// Pipe configuration
    pub(crate) config: PipeConfig,
}

impl PipeInner {
    /// Return a frozen buffer's storage to the pool. When the reader
    /// still holds a snapshot referencing the buffer, the storage cannot
    /// be recovered and the pool is told to forget it instead.
    pub(crate) fn release_frozen(&self, buffer: Arc<Buffer>) {
        match Arc::try_unwrap(buffer) {
            Ok(owned) => {
                if let Err(error) = self.pool.release(owned) {
                    warn!(%error, "reclaimed buffer was not checked out");
                }
            }
            Err(still_shared) => self.pool.forfeit(still_shared.id()),
        }
    }
}

/// A single-producer/single-consumer byte pipe.
///
/// [`split`](Self::split) yields the two handles; each may move to its
/// own thread.
#[derive(Debug)]
pub struct BytePipe {
    inner: Arc<PipeInner>,
}

impl BytePipe {
    /// Create a pipe with its own buffer pool
    pub fn new(config: PipeConfig) -> Result<Self> {
        config.validate()?;
        let pool = Arc::new(BufferPool::new(config.pool.clone())?);
        Self::with_pool(config, pool)
    }

    /// Create a pipe over an existing pool, so the caller can observe
    /// reclamation or share the pool's configuration
    pub fn with_pool(config: PipeConfig, pool: Arc<BufferPool>) -> Result<Self> {
        config.validate()?;
        debug!(
            chunk_size = pool.config().chunk_size,
            outstanding_limit = ?config.outstanding_limit,
            "pipe created"
        );
        Ok(Self {
            inner: Arc::new(PipeInner {
                shared: Mutex::new(PipeShared::new()),
                cond: Arc::new(Condvar::new()),
                pool,
                config,
            }),
        })
    }

    /// Create a pipe with the default configuration
    pub fn with_defaults() -> Self {
        Self::new(PipeConfig::default()).expect("default pipe config is valid")
    }

    /// Split the pipe into its producer and consumer handles
    pub fn split(self) -> (PipeWriter, PipeReader) {
        let writer = PipeWriter::new(Arc::clone(&self.inner));
        let reader = PipeReader::new(self.inner);
        (writer, reader)
    }
}
