/*!
 * Application Cell Library
 * In-process isolation scopes: virtual stdio channels, scoped configuration,
 * and per-scope port/management views multiplexed inside one host process
 */

pub mod core;
pub mod mgmt;
pub mod net;
pub mod pipe;
pub mod scope;

// Re-exports
pub use crate::core::errors::ScopeError;
pub use crate::core::limits::{DEFAULT_PIPE_CAPACITY, MAX_PIPE_CAPACITY};
pub use crate::core::types::ScopeResult;
pub use mgmt::Namespace;
pub use net::AvailablePorts;
pub use pipe::{pipe, PipeError, PipeReader, PipeStats, PipeWriter};
pub use scope::{
    AppCell, AppCellBuilder, AppStdio, InputChannel, Lifecycle, OutputChannel, Properties,
    ReleaseError, ReleaseSequence, ReleaseStats, ReleaseStep, Scope, ScopeListener, StdioChannels,
};
