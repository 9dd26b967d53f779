/*!
 * Core Types
 * Common types used across the crate
 */

/// Size type for buffer operations
pub type Size = usize;

/// Pipe identifier, unique within the host process
pub type PipeId = u32;

/// Common result type for scope operations
pub type ScopeResult<T> = Result<T, super::errors::ScopeError>;
