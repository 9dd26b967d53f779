/*!
 * Scope Module
 * Isolation scopes: base contract, stdio triad, and lifecycle controller
 */

pub mod base;
pub mod cell;
pub mod listener;
pub mod release;
pub mod triad;
pub mod types;

// Re-export public API
pub use base::{Lifecycle, Scope};
pub use cell::{AppCell, AppCellBuilder, AppStdio};
pub use listener::ScopeListener;
pub use release::{ReleaseError, ReleaseSequence, ReleaseStats, ReleaseStep};
pub use triad::{InputChannel, OutputChannel, StdioChannels};
pub use types::Properties;
