/*!
 * Application Cell
 * The scope lifecycle controller: owns the stdio triad, composes
 * configuration, and performs the idempotent teardown
 */

use super::base::{Lifecycle, Scope};
use super::listener::ScopeListener;
use super::release::{ReleaseSequence, ReleaseStep};
use super::triad::StdioChannels;
use super::types::Properties;
use crate::core::errors::ScopeError;
use crate::core::limits::DEFAULT_PIPE_CAPACITY;
use crate::core::types::{ScopeResult, Size};
use crate::mgmt::Namespace;
use crate::net::AvailablePorts;
use crate::pipe::{PipeReader, PipeWriter};
use log::{debug, info};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Ownership tag for the management namespace bound to a cell.
///
/// A namespace the cell built is released on close; one supplied by the
/// caller is never released by this cell.
enum NamespaceHandle {
    Owned(Arc<Namespace>),
    Borrowed(Arc<Namespace>),
}

impl NamespaceHandle {
    fn get(&self) -> &Arc<Namespace> {
        match self {
            NamespaceHandle::Owned(namespace) | NamespaceHandle::Borrowed(namespace) => namespace,
        }
    }
}

/// The application-side stdio surface: what a hosted application sees as
/// its own standard streams. Handles are aliases of the cell's channel
/// ends, so they go dead together on close.
pub struct AppStdio {
    out: PipeWriter,
    err: PipeWriter,
    input: PipeReader,
}

impl AppStdio {
    /// Standard output writer.
    pub fn out(&self) -> PipeWriter {
        self.out.clone()
    }

    /// Standard error writer; an alias of the output writer when the cell
    /// redirects stderr.
    pub fn err(&self) -> PipeWriter {
        self.err.clone()
    }

    /// Standard input reader.
    pub fn input(&self) -> PipeReader {
        self.input.clone()
    }
}

/// An in-process isolation scope for one simulated application.
///
/// Owns three virtual stdio channels, an effective configuration view, and
/// a management namespace, all multiplexed inside the host process. Created
/// once, used for the lifetime of the simulated application, closed exactly
/// once (extra close calls are no-ops).
pub struct AppCell {
    base: Scope,
    channels: StdioChannels,
    stdio: AppStdio,
    namespace: NamespaceHandle,
    listeners: Vec<Arc<dyn ScopeListener>>,
}

impl AppCell {
    /// Start assembling a cell with the given name.
    pub fn builder(name: impl Into<String>) -> AppCellBuilder {
        AppCellBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    /// Effective configuration: builder defaults with overrides applied.
    pub fn properties(&self) -> &Properties {
        self.base.properties()
    }

    pub fn ports(&self) -> &Arc<AvailablePorts> {
        self.base.ports()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.base.lifecycle()
    }

    pub fn is_closed(&self) -> bool {
        self.base.is_closed()
    }

    pub fn is_stderr_redirected(&self) -> bool {
        self.channels.is_redirected()
    }

    /// Observer end of standard output. Always present.
    pub fn stdout_reader(&self) -> PipeReader {
        self.channels.stdout.reader.clone()
    }

    /// Observer end of standard error.
    ///
    /// Fails whenever stderr is redirected to stdout, in any scope state;
    /// callers should branch on [`is_stderr_redirected`](Self::is_stderr_redirected)
    /// first.
    pub fn stderr_reader(&self) -> ScopeResult<PipeReader> {
        match &self.channels.stderr {
            Some(channel) => Ok(channel.reader.clone()),
            None => Err(ScopeError::StderrRedirected {
                scope: self.base.name().to_string(),
            }),
        }
    }

    /// Observer end of standard input: writes here become the hosted
    /// application's input. Always present.
    pub fn stdin_writer(&self) -> PipeWriter {
        self.channels.stdin.writer.clone()
    }

    /// The application-side stdio surface.
    pub fn stdio(&self) -> &AppStdio {
        &self.stdio
    }

    /// Application end of standard output.
    pub fn stdout_writer(&self) -> PipeWriter {
        self.stdio.out()
    }

    /// Application end of standard error (stdout's writer when redirected).
    pub fn stderr_writer(&self) -> PipeWriter {
        self.stdio.err()
    }

    /// Application end of standard input.
    pub fn stdin_reader(&self) -> PipeReader {
        self.stdio.input()
    }

    /// The bound management namespace, owned or borrowed.
    pub fn namespace(&self) -> &Arc<Namespace> {
        self.namespace.get()
    }

    /// Close the cell, releasing every owned resource.
    ///
    /// Safe to invoke any number of times, sequentially or concurrently:
    /// the teardown body runs exactly once, behind the base scope's
    /// compare-and-set transition. Individual release failures are
    /// suppressed so every resource gets its own release attempt; nothing
    /// is propagated to the caller.
    pub fn close(&self) {
        if !self.base.begin_close() {
            return;
        }

        self.notify(|listener, scope| listener.on_closing(scope));

        let mut sequence = ReleaseSequence::new();

        let writer = self.channels.stdout.writer.clone();
        sequence.push(ReleaseStep::infallible("stdout writer", move || {
            writer.close()
        }));
        let reader = self.channels.stdout.reader.clone();
        sequence.push(ReleaseStep::infallible("stdout reader", move || {
            reader.close()
        }));
        let alias = self.stdio.out.clone();
        sequence.push(ReleaseStep::infallible("stdout stream", move || {
            alias.close()
        }));

        // The redirected case has no stderr resources of its own: the
        // error writer is stdout's writer, already released above.
        if let Some(stderr) = &self.channels.stderr {
            let writer = stderr.writer.clone();
            sequence.push(ReleaseStep::infallible("stderr writer", move || {
                writer.close()
            }));
            let reader = stderr.reader.clone();
            sequence.push(ReleaseStep::infallible("stderr reader", move || {
                reader.close()
            }));
            let alias = self.stdio.err.clone();
            sequence.push(ReleaseStep::infallible("stderr stream", move || {
                alias.close()
            }));
        }

        let writer = self.channels.stdin.writer.clone();
        sequence.push(ReleaseStep::infallible("stdin writer", move || {
            writer.close()
        }));
        let reader = self.channels.stdin.reader.clone();
        sequence.push(ReleaseStep::infallible("stdin reader", move || {
            reader.close()
        }));
        let alias = self.stdio.input.clone();
        sequence.push(ReleaseStep::infallible("stdin stream", move || {
            alias.close()
        }));

        if let NamespaceHandle::Owned(namespace) = &self.namespace {
            let namespace = Arc::clone(namespace);
            sequence.push(ReleaseStep::infallible("management namespace", move || {
                namespace.close()
            }));
        }

        let stats = sequence.run();
        debug!(
            "scope [{}] teardown drained {} release steps",
            self.base.name(),
            stats.attempted()
        );

        self.base.finish_close();
        self.notify(|listener, scope| listener.on_closed(scope));

        info!("closed scope [{}]", self.base.name());
    }

    fn notify(&self, hook: impl Fn(&dyn ScopeListener, &str)) {
        for listener in &self.listeners {
            let scope = self.base.name();
            if catch_unwind(AssertUnwindSafe(|| hook(listener.as_ref(), scope))).is_err() {
                debug!("listener panicked during close of scope [{}]", scope);
            }
        }
    }
}

impl Drop for AppCell {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for AppCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCell")
            .field("name", &self.base.name())
            .field("lifecycle", &self.base.lifecycle())
            .field("stderr_redirected", &self.is_stderr_redirected())
            .field("namespace_port", &self.namespace().port())
            .finish()
    }
}

/// Assembles an [`AppCell`].
///
/// Properties compose in two layers: `defaults` seed the set, `overrides`
/// win on key collision. Everything else falls back to crate defaults: the
/// process-wide port allocator, an owned namespace bound to it, no
/// redirect, and [`DEFAULT_PIPE_CAPACITY`] per channel.
pub struct AppCellBuilder {
    name: String,
    defaults: Properties,
    overrides: Properties,
    ports: Option<Arc<AvailablePorts>>,
    namespace: Option<Arc<Namespace>>,
    redirect_stderr: bool,
    capacity: Size,
    listeners: Vec<Arc<dyn ScopeListener>>,
}

impl AppCellBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: Properties::new(),
            overrides: Properties::new(),
            ports: None,
            namespace: None,
            redirect_stderr: false,
            capacity: DEFAULT_PIPE_CAPACITY,
            listeners: Vec::new(),
        }
    }

    /// Seed the property set.
    pub fn defaults(mut self, defaults: Properties) -> Self {
        self.defaults = defaults;
        self
    }

    /// Properties merged over the defaults; overrides win per key.
    pub fn overrides(mut self, overrides: Properties) -> Self {
        self.overrides = overrides;
        self
    }

    /// Use a specific port allocator instead of the process-wide one.
    pub fn ports(mut self, ports: Arc<AvailablePorts>) -> Self {
        self.ports = Some(ports);
        self
    }

    /// Bind an externally supplied management namespace. The cell borrows
    /// it and will not release it on close.
    pub fn namespace(mut self, namespace: Arc<Namespace>) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Merge the error stream into the output stream.
    pub fn redirect_stderr(mut self, redirect: bool) -> Self {
        self.redirect_stderr = redirect;
        self
    }

    /// Per-channel pipe capacity in bytes.
    pub fn capacity(mut self, capacity: Size) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn listener(mut self, listener: Arc<dyn ScopeListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn build(self) -> ScopeResult<AppCell> {
        if self.name.is_empty() {
            return Err(ScopeError::EmptyName);
        }

        let ports = self.ports.unwrap_or_else(AvailablePorts::shared);

        let channels = StdioChannels::build(&self.name, self.capacity, self.redirect_stderr)?;
        let stdio = AppStdio {
            out: channels.stdout.writer.clone(),
            err: channels.stderr_writer(),
            input: channels.stdin.reader.clone(),
        };

        let namespace = match self.namespace {
            Some(namespace) => NamespaceHandle::Borrowed(namespace),
            None => NamespaceHandle::Owned(Arc::new(Namespace::new(
                self.name.clone(),
                Arc::clone(&ports),
            )?)),
        };

        let mut properties = self.defaults;
        properties.merge(&self.overrides);

        info!(
            "created scope [{}] (capacity: {} bytes, stderr redirected: {})",
            self.name, self.capacity, self.redirect_stderr
        );

        Ok(AppCell {
            base: Scope::new(self.name, properties, ports),
            channels,
            stdio,
            namespace,
            listeners: self.listeners,
        })
    }
}
