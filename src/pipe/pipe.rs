/*!
 * Pipe Implementation
 * Core pipe state with ringbuf-based circular buffer and condvar blocking
 */

use super::types::{PipeError, PipeStats};
use crate::core::limits::MAX_PIPE_CAPACITY;
use crate::core::types::{PipeId, Size};
use parking_lot::{Condvar, Mutex};
use ringbuf::{traits::*, HeapRb};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

static NEXT_PIPE_ID: AtomicU32 = AtomicU32::new(1);

/// State shared between the two ends of a pipe.
///
/// A single mutex guards the ring buffer and the two open flags; the pair
/// of condvars separates "space became available" from "data became
/// available" so a wake never bounces between two blocked writers.
pub(super) struct PipeShared {
    pub(super) id: PipeId,
    pub(super) capacity: Size,
    state: Mutex<PipeState>,
    /// Signalled when bytes are consumed or the reader end closes
    space: Condvar,
    /// Signalled when bytes are produced or the writer end closes
    data: Condvar,
}

struct PipeState {
    buffer: HeapRb<u8>,
    writer_open: bool,
    reader_open: bool,
}

impl std::fmt::Debug for PipeShared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PipeShared")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("buffered", &state.buffer.occupied_len())
            .field("writer_open", &state.writer_open)
            .field("reader_open", &state.reader_open)
            .finish()
    }
}

impl PipeShared {
    pub(super) fn new(capacity: Size) -> Result<Arc<Self>, PipeError> {
        if capacity == 0 || capacity > MAX_PIPE_CAPACITY {
            return Err(PipeError::CapacityInvalid {
                requested: capacity,
                max: MAX_PIPE_CAPACITY,
            });
        }

        Ok(Arc::new(Self {
            id: NEXT_PIPE_ID.fetch_add(1, Ordering::Relaxed),
            capacity,
            state: Mutex::new(PipeState {
                buffer: HeapRb::new(capacity),
                writer_open: true,
                reader_open: true,
            }),
            space: Condvar::new(),
            data: Condvar::new(),
        }))
    }

    /// Write bytes, blocking while the buffer is full.
    ///
    /// Returns once at least one byte was accepted; the count may be short
    /// of `data.len()` when the buffer fills mid-write.
    pub(super) fn write(&self, data: &[u8]) -> Result<Size, PipeError> {
        if data.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock();
        loop {
            if !state.writer_open || !state.reader_open {
                return Err(PipeError::Closed);
            }

            let written = state.buffer.push_slice(data);
            if written > 0 {
                self.data.notify_all();
                return Ok(written);
            }

            self.space.wait(&mut state);
        }
    }

    /// Read bytes, blocking while the buffer is empty and the writer end
    /// is still open. Returns `Ok(0)` at end-of-stream.
    pub(super) fn read(&self, buf: &mut [u8]) -> Result<Size, PipeError> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock();
        loop {
            if !state.reader_open {
                return Ok(0);
            }

            let read = state.buffer.pop_slice(buf);
            if read > 0 {
                self.space.notify_all();
                return Ok(read);
            }

            if !state.writer_open {
                return Ok(0); // EOF: writer gone and buffer drained
            }

            self.data.wait(&mut state);
        }
    }

    pub(super) fn try_write(&self, data: &[u8]) -> Result<Size, PipeError> {
        if data.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock();
        if !state.writer_open || !state.reader_open {
            return Err(PipeError::Closed);
        }

        let written = state.buffer.push_slice(data);
        if written == 0 {
            return Err(PipeError::WouldBlock("pipe buffer full"));
        }

        self.data.notify_all();
        Ok(written)
    }

    pub(super) fn try_read(&self, buf: &mut [u8]) -> Result<Size, PipeError> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock();
        if !state.reader_open {
            return Ok(0);
        }

        let read = state.buffer.pop_slice(buf);
        if read > 0 {
            self.space.notify_all();
            return Ok(read);
        }

        if !state.writer_open {
            return Ok(0);
        }

        Err(PipeError::WouldBlock("no data available"))
    }

    /// Close the writer end. Idempotent; wakes every blocked peer.
    pub(super) fn close_writer(&self) {
        let mut state = self.state.lock();
        if state.writer_open {
            state.writer_open = false;
            drop(state);
            self.data.notify_all();
            self.space.notify_all();
        }
    }

    /// Close the reader end. Idempotent; wakes every blocked peer.
    pub(super) fn close_reader(&self) {
        let mut state = self.state.lock();
        if state.reader_open {
            state.reader_open = false;
            drop(state);
            self.data.notify_all();
            self.space.notify_all();
        }
    }

    pub(super) fn writer_open(&self) -> bool {
        self.state.lock().writer_open
    }

    pub(super) fn reader_open(&self) -> bool {
        self.state.lock().reader_open
    }

    pub(super) fn buffered(&self) -> Size {
        self.state.lock().buffer.occupied_len()
    }

    pub(super) fn stats(&self) -> PipeStats {
        let state = self.state.lock();
        PipeStats {
            id: self.id,
            capacity: self.capacity,
            buffered: state.buffer.occupied_len(),
            writer_open: state.writer_open,
            reader_open: state.reader_open,
        }
    }
}
