/*!
 * Scope Listeners
 * Lifecycle notification boundary for embedding runtimes
 */

/// Callbacks around scope teardown.
///
/// Both hooks run inside the close transition, so each fires exactly once
/// per scope no matter how many callers race on close: `on_closing` before
/// any resource is released, `on_closed` after the release sequence has
/// drained. Each notification runs in its own failure boundary; a
/// panicking listener does not abort teardown.
pub trait ScopeListener: Send + Sync {
    fn on_closing(&self, _scope: &str) {}

    fn on_closed(&self, _scope: &str) {}
}
