/*!
 * Error Types
 * Centralized error handling with thiserror and miette support
 */

use crate::pipe::PipeError;
use miette::Diagnostic;
use thiserror::Error;

/// Scope-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ScopeError {
    #[error("could not establish stdio pipes for scope [{scope}]")]
    #[diagnostic(
        code(scope::allocation_failed),
        help("The scope is unusable and must be discarded. Check the requested capacity against MAX_PIPE_CAPACITY.")
    )]
    AllocationFailed {
        scope: String,
        #[source]
        source: PipeError,
    },

    #[error("standard error of scope [{scope}] is redirected to standard output")]
    #[diagnostic(
        code(scope::stderr_redirected),
        help("Check is_stderr_redirected() before requesting the stderr reader.")
    )]
    StderrRedirected { scope: String },

    #[error("scope name must not be empty")]
    #[diagnostic(code(scope::empty_name))]
    EmptyName,

    #[error("no ports available in range {start}..{end}")]
    #[diagnostic(
        code(scope::ports_exhausted),
        help("Release unused ports or configure the allocator with a wider range.")
    )]
    PortsExhausted { start: u16, end: u16 },

    #[error("management namespace [{name}] is closed")]
    #[diagnostic(code(scope::namespace_closed))]
    NamespaceClosed { name: String },
}
