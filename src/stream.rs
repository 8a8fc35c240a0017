//! Byte-stream adapters over the pipe surfaces
//!
//! Thin interop layer translating `std::io::Write`/`std::io::Read` into
//! calls on the producer and consumer surfaces. Pipe errors map onto
//! `std::io::Error` via the crate's `From` impl.

use std::io::{self, Read, Write};

use crate::pipe::{PipeReader, PipeWriter};

/// `std::io::Write` adapter over a [`PipeWriter`].
///
/// Each `write` reserves, copies and commits; `flush` publishes to the
/// reader. Dropping the stream completes the writer, so a reader blocked
/// in `read` observes end-of-stream.
#[derive(Debug)]
pub struct PipeWriteStream {
    writer: PipeWriter,
}

impl PipeWriteStream {
    pub fn new(writer: PipeWriter) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> PipeWriter {
        self.writer
    }

    /// Flush remaining bytes and complete the writer explicitly
    pub fn complete(mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.complete(None)?;
        Ok(())
    }
}

impl Write for PipeWriteStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            let span = self.writer.reserve(1)?;
            let n = span.len().min(buf.len() - written);
            span[..n].copy_from_slice(&buf[written..written + n]);
            self.writer.commit(n)?;
            written += n;
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// `std::io::Read` adapter over a [`PipeReader`].
///
/// Each `read` snapshots the pipe, copies as much as fits into the
/// caller's buffer and consumes exactly what it copied, so un-copied
/// bytes stay queued for the next call. Returns `Ok(0)` at end of
/// stream.
#[derive(Debug)]
pub struct PipeReadStream {
    reader: PipeReader,
    /// End of stream already observed and acknowledged
    finished: bool,
}

impl PipeReadStream {
    pub fn new(reader: PipeReader) -> Self {
        Self {
            reader,
            finished: false,
        }
    }

    /// Recover the underlying reader
    pub fn into_inner(self) -> PipeReader {
        self.reader
    }
}

impl Read for PipeReadStream {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.finished || out.is_empty() {
            return Ok(0);
        }

        let result = loop {
            let result = self.reader.read()?;
            if result.view.is_empty() {
                if result.completed {
                    self.finished = true;
                    let _ = self.reader.complete();
                    return Ok(0);
                }
                continue;
            }
            break result;
        };

        let start = result.view.start_position();
        let mut copied = 0usize;
        for slice in result.view.iter() {
            if copied == out.len() {
                break;
            }
            let n = slice.len().min(out.len() - copied);
            out[copied..copied + n].copy_from_slice(&slice[..n]);
            copied += n;
        }

        let consumed = start + copied as u64;
        // Drop the snapshot before advancing so released buffers return
        // to the pool rather than being forfeited.
        drop(result);
        self.reader.advance_to(consumed, consumed)?;
        Ok(copied)
    }
}
