/*!
 * Port Allocation
 * Shared view of network port availability across scopes
 */

use crate::core::errors::ScopeError;
use crate::core::limits::DEFAULT_PORT_RANGE;
use crate::core::types::ScopeResult;
use ahash::RandomState;
use crossbeam_queue::SegQueue;
use dashmap::DashSet;
use log::debug;
use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

static SHARED: OnceLock<Arc<AvailablePorts>> = OnceLock::new();

/// Allocator handing out ports from a fixed range.
///
/// Shared across scopes; all state is internally synchronized, so callers
/// need no locking of their own. Released ports are recycled through a
/// lock-free free list before the range cursor advances.
pub struct AvailablePorts {
    range: Range<u16>,
    /// Cursor into the range; u32 so exhaustion never wraps at u16::MAX
    cursor: AtomicU32,
    /// Recycled ports, handed out again before fresh ones
    free: SegQueue<u16>,
    outstanding: DashSet<u16, RandomState>,
}

impl AvailablePorts {
    pub fn new(range: Range<u16>) -> Self {
        Self {
            range,
            cursor: AtomicU32::new(0),
            free: SegQueue::new(),
            outstanding: DashSet::with_hasher(RandomState::new()),
        }
    }

    /// The process-wide default allocator over [`DEFAULT_PORT_RANGE`].
    pub fn shared() -> Arc<Self> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::new(DEFAULT_PORT_RANGE))))
    }

    pub fn range(&self) -> &Range<u16> {
        &self.range
    }

    /// Ports currently handed out and not yet released.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Hand out the next available port.
    pub fn next(&self) -> ScopeResult<u16> {
        if let Some(port) = self.free.pop() {
            self.outstanding.insert(port);
            debug!("recycled port {}", port);
            return Ok(port);
        }

        loop {
            let offset = self.cursor.fetch_add(1, Ordering::Relaxed);
            let candidate = self.range.start as u32 + offset;
            if candidate >= self.range.end as u32 {
                return Err(ScopeError::PortsExhausted {
                    start: self.range.start,
                    end: self.range.end,
                });
            }

            let port = candidate as u16;
            if self.outstanding.insert(port) {
                debug!("allocated port {}", port);
                return Ok(port);
            }
        }
    }

    /// Return a previously allocated port to the pool. Unknown ports are
    /// ignored, so double release is harmless.
    pub fn release(&self, port: u16) {
        if self.outstanding.remove(&port).is_some() {
            self.free.push(port);
            debug!("released port {}", port);
        }
    }
}

impl std::fmt::Debug for AvailablePorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailablePorts")
            .field("range", &self.range)
            .field("outstanding", &self.outstanding.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_ports_are_unique_while_outstanding() {
        let ports = AvailablePorts::new(46000..46010);
        let mut seen = HashSet::new();
        for _ in 0..10 {
            assert!(seen.insert(ports.next().unwrap()));
        }
        assert_eq!(ports.outstanding(), 10);
    }

    #[test]
    fn test_exhaustion_reports_range() {
        let ports = AvailablePorts::new(46100..46102);
        ports.next().unwrap();
        ports.next().unwrap();

        let err = ports.next().unwrap_err();
        assert!(matches!(
            err,
            ScopeError::PortsExhausted {
                start: 46100,
                end: 46102
            }
        ));
    }

    #[test]
    fn test_released_ports_are_recycled() {
        let ports = AvailablePorts::new(46200..46201);
        let port = ports.next().unwrap();
        assert!(ports.next().is_err());

        ports.release(port);
        assert_eq!(ports.next().unwrap(), port);
    }

    #[test]
    fn test_double_release_is_harmless() {
        let ports = AvailablePorts::new(46300..46310);
        let port = ports.next().unwrap();
        ports.release(port);
        ports.release(port);

        // Only one copy of the port ever re-enters the pool
        let mut seen = HashSet::new();
        for _ in 0..10 {
            assert!(seen.insert(ports.next().unwrap()));
        }
    }

    #[test]
    fn test_concurrent_allocation_never_collides() {
        let ports = Arc::new(AvailablePorts::new(47000..47064));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ports = Arc::clone(&ports);
                thread::spawn(move || {
                    (0..8)
                        .map(|_| ports.next().unwrap())
                        .collect::<Vec<u16>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for port in handle.join().unwrap() {
                assert!(seen.insert(port));
            }
        }
        assert_eq!(seen.len(), 64);
    }
}
