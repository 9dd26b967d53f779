/*!
 * Scope Base
 * Name, configuration, port allocator reference, and the close transition guard
 */

use super::types::Properties;
use crate::net::AvailablePorts;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle states of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Open,
    Closing,
    Closed,
}

const OPEN: u8 = 0;
const CLOSING: u8 = 1;
const CLOSED: u8 = 2;

/// Common state shared by every scope kind.
///
/// The lifecycle field is the only member mutated after construction: the
/// open-to-closing transition is a compare-and-set, so exactly one caller
/// ever runs a teardown body guarded by it. No lock is involved.
pub struct Scope {
    name: String,
    properties: Properties,
    ports: Arc<AvailablePorts>,
    lifecycle: AtomicU8,
}

impl Scope {
    pub fn new(name: String, properties: Properties, ports: Arc<AvailablePorts>) -> Self {
        Self {
            name,
            properties,
            ports,
            lifecycle: AtomicU8::new(OPEN),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn ports(&self) -> &Arc<AvailablePorts> {
        &self.ports
    }

    /// Attempt the open -> closing transition.
    ///
    /// Returns `true` for exactly one caller; everyone else observes the
    /// transition already taken and must not run the teardown body.
    pub fn begin_close(&self) -> bool {
        self.lifecycle
            .compare_exchange(OPEN, CLOSING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Mark teardown complete (closing -> closed).
    pub fn finish_close(&self) {
        self.lifecycle.store(CLOSED, Ordering::Release);
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self.lifecycle.load(Ordering::Acquire) {
            OPEN => Lifecycle::Open,
            CLOSING => Lifecycle::Closing,
            _ => Lifecycle::Closed,
        }
    }

    /// Whether close has been initiated (closing or closed).
    pub fn is_closed(&self) -> bool {
        self.lifecycle.load(Ordering::Acquire) != OPEN
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("properties", &self.properties.len())
            .field("lifecycle", &self.lifecycle())
            .finish()
    }
}
