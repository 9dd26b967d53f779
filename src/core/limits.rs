/*!
 * Limits and Constants
 *
 * Centralized location for crate-wide limits and defaults.
 * All values include rationale comments explaining WHY they exist.
 */

use std::ops::Range;

// =============================================================================
// PIPE LIMITS
// =============================================================================

/// Default stdio pipe capacity (8KB)
/// Matches the per-channel buffer historically reserved by in-process
/// container runtimes; large enough for line-oriented output, small enough
/// to exert backpressure on chatty applications
pub const DEFAULT_PIPE_CAPACITY: usize = 8192;

/// Maximum pipe capacity (1MB)
/// Prevents a single scope from pinning excessive memory per channel
pub const MAX_PIPE_CAPACITY: usize = 1024 * 1024;

// =============================================================================
// PORT ALLOCATION
// =============================================================================

/// Default range for the process-wide port allocator
/// Registered-port territory, above the well-known range and clear of the
/// common OS ephemeral ranges
pub const DEFAULT_PORT_RANGE: Range<u16> = 30000..31000;
