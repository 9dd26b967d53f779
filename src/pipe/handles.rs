/*!
 * Pipe Handles
 * Cloneable writer/reader ends with blocking std::io semantics
 */

use super::pipe::PipeShared;
use super::types::{PipeError, PipeStats};
use crate::core::types::Size;
use log::trace;
use std::io::{self, Read, Write};
use std::sync::Arc;

/// Create a connected writer/reader pair over a bounded buffer.
pub fn pipe(capacity: Size) -> Result<(PipeWriter, PipeReader), PipeError> {
    let shared = PipeShared::new(capacity)?;
    trace!("pipe {} created (capacity: {} bytes)", shared.id, capacity);

    Ok((
        PipeWriter {
            end: Arc::new(WriterEnd {
                shared: Arc::clone(&shared),
            }),
        },
        PipeReader {
            end: Arc::new(ReaderEnd { shared }),
        },
    ))
}

/// Write end of a bounded byte pipe.
///
/// Clones alias the same end: the end closes when `close` is invoked or
/// when the last alias is dropped, whichever comes first.
#[derive(Debug, Clone)]
pub struct PipeWriter {
    end: Arc<WriterEnd>,
}

#[derive(Debug)]
struct WriterEnd {
    shared: Arc<PipeShared>,
}

impl Drop for WriterEnd {
    fn drop(&mut self) {
        self.shared.close_writer();
    }
}

impl PipeWriter {
    /// Close the write end. Idempotent; blocked readers see end-of-stream
    /// once the buffer drains.
    pub fn close(&self) {
        self.end.shared.close_writer();
    }

    pub fn is_closed(&self) -> bool {
        !self.end.shared.writer_open()
    }

    /// Non-blocking write attempt.
    pub fn try_write(&self, data: &[u8]) -> Result<Size, PipeError> {
        self.end.shared.try_write(data)
    }

    pub fn stats(&self) -> PipeStats {
        self.end.shared.stats()
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.end.shared.write(buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Write for &PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.end.shared.write(buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Read end of a bounded byte pipe.
///
/// Clones alias the same end, sharing close semantics with [`PipeWriter`].
#[derive(Debug, Clone)]
pub struct PipeReader {
    end: Arc<ReaderEnd>,
}

#[derive(Debug)]
struct ReaderEnd {
    shared: Arc<PipeShared>,
}

impl Drop for ReaderEnd {
    fn drop(&mut self) {
        self.shared.close_reader();
    }
}

impl PipeReader {
    /// Close the read end. Idempotent; blocked writers fail with a
    /// broken-pipe error.
    pub fn close(&self) {
        self.end.shared.close_reader();
    }

    pub fn is_closed(&self) -> bool {
        !self.end.shared.reader_open()
    }

    /// Non-blocking read attempt. `Ok(0)` means end-of-stream.
    pub fn try_read(&self, buf: &mut [u8]) -> Result<Size, PipeError> {
        self.end.shared.try_read(buf)
    }

    /// Bytes currently buffered and readable.
    pub fn buffered(&self) -> Size {
        self.end.shared.buffered()
    }

    pub fn stats(&self) -> PipeStats {
        self.end.shared.stats()
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.end.shared.read(buf).map_err(Into::into)
    }
}

impl Read for &PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.end.shared.read(buf).map_err(Into::into)
    }
}
