/*!
 * Release Sequence
 * Ordered, failure-isolated teardown of scope-owned resources
 */

use log::trace;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;

/// Failure raised by an individual release step.
///
/// Suppressed by the sequence runner: recorded in [`ReleaseStats`], never
/// propagated to the close caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to release {resource}: {reason}")]
pub struct ReleaseError {
    pub resource: &'static str,
    pub reason: String,
}

/// One release attempt over a named resource.
pub struct ReleaseStep {
    resource: &'static str,
    action: Box<dyn FnOnce() -> Result<(), ReleaseError> + Send>,
}

impl ReleaseStep {
    pub fn new<F>(resource: &'static str, action: F) -> Self
    where
        F: FnOnce() -> Result<(), ReleaseError> + Send + 'static,
    {
        Self {
            resource,
            action: Box::new(action),
        }
    }

    /// Step over an action that cannot fail.
    pub fn infallible<F>(resource: &'static str, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::new(resource, move || {
            action();
            Ok(())
        })
    }
}

/// Outcome of running a [`ReleaseSequence`].
#[derive(Debug, Clone, Default)]
pub struct ReleaseStats {
    pub released: usize,
    pub failed: usize,
    pub failures: Vec<ReleaseError>,
}

impl ReleaseStats {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    pub fn attempted(&self) -> usize {
        self.released + self.failed
    }
}

/// Ordered list of release steps.
///
/// Every step is attempted exactly once, in registration order, regardless
/// of prior outcomes: pipe ends are cross-linked, so a peer's earlier
/// failure never excuses skipping a resource's own release attempt. Each
/// step runs inside its own failure boundary; errors and panics alike are
/// absorbed into the stats.
#[derive(Default)]
pub struct ReleaseSequence {
    steps: Vec<ReleaseStep>,
}

impl ReleaseSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step (builder form).
    pub fn then(mut self, step: ReleaseStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: ReleaseStep) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Drain the sequence, attempting every step.
    pub fn run(self) -> ReleaseStats {
        let mut stats = ReleaseStats::default();

        for step in self.steps {
            let resource = step.resource;
            let action = step.action;

            let outcome = catch_unwind(AssertUnwindSafe(action)).unwrap_or_else(|_| {
                Err(ReleaseError {
                    resource,
                    reason: "release panicked".to_string(),
                })
            });

            match outcome {
                Ok(()) => {
                    stats.released += 1;
                    trace!("released {}", resource);
                }
                Err(err) => {
                    stats.failed += 1;
                    stats.failures.push(err);
                }
            }
        }

        stats
    }
}
