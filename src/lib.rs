//! # bytepipe - SPSC byte pipe with pooled buffers and zero-copy views
//!
//! bytepipe moves opaque bytes from a single producer to a single
//! consumer through a bounded pool of fixed-size buffers, exposing the
//! queued data to the consumer as a zero-copy logical sequence instead of
//! concatenating it into a contiguous array.
//!
//! ## Features
//!
//! - **Pooled buffers**: fixed-chunk [`BufferPool`] with checked-out
//!   tracking, optional growth cap and reclamation on consume
//! - **Zero-copy sequences**: [`SegmentChain`] stitches discontiguous
//!   buffers into one ordered view addressed by running index
//! - **Batched visibility**: committed bytes become observable only at
//!   `flush`, the producer-to-consumer visibility boundary
//! - **Dual cursors**: the reader reports consumed and examined positions
//!   separately, allowing look-ahead without discarding data
//! - **Backpressure**: opt-in outstanding-bytes watermark suspending the
//!   producer until the consumer catches up
//! - **Cancellation**: every suspension point accepts a [`CancelToken`]
//! - **Stream interop**: `std::io` adapters over both pipe surfaces
//!
//! ## Data flow
//!
//! ```text
//! Producer ──borrow── BufferPool
//!    │ reserve / commit
//!    ▼
//! PipeWriter ──flush── queued buffers ──read── PipeReader
//!                                                 │ advance_to
//!                                                 ▼
//!                                      BufferPool (reclaim)
//! ```
//!
//! ## Example
//!
//! ```
//! use bytepipe::{BytePipe, PipeConfig};
//!
//! let (mut writer, mut reader) = BytePipe::new(PipeConfig::default())?.split();
//!
//! let span = writer.reserve(5)?;
//! span[..5].copy_from_slice(b"hello");
//! writer.commit(5)?;
//! writer.flush()?;
//!
//! let result = reader.read()?;
//! let mut out = vec![0u8; result.view.len()];
//! result.view.copy_to(&mut out)?;
//! assert_eq!(out, b"hello");
//!
//! let end = result.view.end_position();
//! drop(result);
//! reader.advance_to(end, end)?;
//! # Ok::<(), bytepipe::PipeError>(())
//! ```

pub mod cancel;
pub mod error;
pub mod pipe;
pub mod pool;
pub mod sequence;
pub mod stream;

pub use cancel::CancelToken;
pub use error::{PipeError, Result};
pub use pipe::{BytePipe, PipeConfig, PipeLifecycle, PipeReader, PipeStats, PipeWriter, ReadResult};
pub use pool::{Buffer, BufferPool, BufferPoolConfig, BufferPoolStats};
pub use sequence::{Segment, SegmentChain, SequenceView};
pub use stream::{PipeReadStream, PipeWriteStream};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
