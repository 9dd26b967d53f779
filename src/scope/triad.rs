/*!
 * Channel Triad
 * Builds the three stdio channels and applies the stderr-redirect policy
 */

use crate::core::errors::ScopeError;
use crate::core::types::Size;
use crate::pipe::{pipe, PipeReader, PipeWriter};
use log::debug;

/// An output-role channel: the application writes, observers read.
#[derive(Debug)]
pub struct OutputChannel {
    pub(crate) writer: PipeWriter,
    pub(crate) reader: PipeReader,
}

impl OutputChannel {
    /// Application-facing producer end.
    pub fn writer(&self) -> PipeWriter {
        self.writer.clone()
    }

    /// Observer-facing consumer end.
    pub fn reader(&self) -> PipeReader {
        self.reader.clone()
    }
}

/// An input-role channel: observers write, the application reads.
///
/// Direction is inverted relative to [`OutputChannel`]; the two named
/// types keep the producer/consumer roles explicit at every use site.
#[derive(Debug)]
pub struct InputChannel {
    pub(crate) writer: PipeWriter,
    pub(crate) reader: PipeReader,
}

impl InputChannel {
    /// Observer-facing producer end.
    pub fn writer(&self) -> PipeWriter {
        self.writer.clone()
    }

    /// Application-facing consumer end.
    pub fn reader(&self) -> PipeReader {
        self.reader.clone()
    }
}

/// The three stdio channels owned by a scope.
///
/// Exactly one of two shapes holds for the error stream, fixed at build
/// time and immutable after: an independent channel, or no channel at all
/// with the error writer aliasing the output writer.
#[derive(Debug)]
pub struct StdioChannels {
    pub(crate) stdout: OutputChannel,
    pub(crate) stderr: Option<OutputChannel>,
    pub(crate) stdin: InputChannel,
}

impl StdioChannels {
    /// Build all channels eagerly with a fixed per-pipe capacity.
    ///
    /// Fails fatally when any pipe cannot be allocated; a partially built
    /// triad is never returned.
    pub fn build(
        scope: &str,
        capacity: Size,
        redirect_stderr: bool,
    ) -> Result<Self, ScopeError> {
        let (stdout_writer, stdout_reader) =
            pipe(capacity).map_err(|source| ScopeError::AllocationFailed {
                scope: scope.to_string(),
                source,
            })?;

        let stderr = if redirect_stderr {
            None
        } else {
            let (writer, reader) =
                pipe(capacity).map_err(|source| ScopeError::AllocationFailed {
                    scope: scope.to_string(),
                    source,
                })?;
            Some(OutputChannel { writer, reader })
        };

        let (stdin_writer, stdin_reader) =
            pipe(capacity).map_err(|source| ScopeError::AllocationFailed {
                scope: scope.to_string(),
                source,
            })?;

        debug!(
            "stdio channels built for scope [{}] (capacity: {} bytes, stderr redirected: {})",
            scope, capacity, redirect_stderr
        );

        Ok(Self {
            stdout: OutputChannel {
                writer: stdout_writer,
                reader: stdout_reader,
            },
            stderr,
            stdin: InputChannel {
                writer: stdin_writer,
                reader: stdin_reader,
            },
        })
    }

    pub fn is_redirected(&self) -> bool {
        self.stderr.is_none()
    }

    pub fn stdout(&self) -> &OutputChannel {
        &self.stdout
    }

    /// The independent error channel; `None` while redirected.
    pub fn stderr(&self) -> Option<&OutputChannel> {
        self.stderr.as_ref()
    }

    pub fn stdin(&self) -> &InputChannel {
        &self.stdin
    }

    /// Application-facing stderr writer: the independent channel's writer,
    /// or an alias of the stdout writer when redirected.
    pub(crate) fn stderr_writer(&self) -> PipeWriter {
        match &self.stderr {
            Some(channel) => channel.writer.clone(),
            None => self.stdout.writer.clone(),
        }
    }
}
