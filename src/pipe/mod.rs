/*!
 * Pipe Module
 * Bounded byte pipes connecting the ends of a scope's stdio channels
 */

mod handles;
mod pipe;
pub mod types;

// Re-export public API
pub use handles::{pipe, PipeReader, PipeWriter};
pub use types::{PipeError, PipeStats};
