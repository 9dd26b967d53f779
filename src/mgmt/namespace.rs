/*!
 * Management Namespace
 * Isolated introspection registry bound to the shared port allocator
 */

use crate::core::errors::ScopeError;
use crate::core::types::ScopeResult;
use crate::net::AvailablePorts;
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, info};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Management/introspection registry for one scope.
///
/// Binds to the shared port allocator at construction, reserving one port
/// as the namespace's management endpoint. Entries are arbitrary JSON
/// values keyed by name; each namespace instance is fully isolated from
/// every other.
pub struct Namespace {
    name: String,
    port: u16,
    ports: Arc<AvailablePorts>,
    entries: DashMap<String, Value, RandomState>,
    closed: AtomicBool,
}

impl Namespace {
    pub fn new(name: impl Into<String>, ports: Arc<AvailablePorts>) -> ScopeResult<Self> {
        let name = name.into();
        let port = ports.next()?;
        info!("management namespace [{}] bound to port {}", name, port);

        Ok(Self {
            name,
            port,
            ports,
            entries: DashMap::with_hasher(RandomState::new()),
            closed: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The management endpoint port reserved for this namespace.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn register(&self, key: impl Into<String>, value: Value) -> ScopeResult<()> {
        if self.is_closed() {
            return Err(ScopeError::NamespaceClosed {
                name: self.name.clone(),
            });
        }
        self.entries.insert(key.into(), value);
        Ok(())
    }

    pub fn lookup(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn deregister(&self, key: &str) -> Option<Value> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Point-in-time JSON view of every registered entry.
    pub fn snapshot(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
        )
    }

    /// Close the namespace: clear the registry and return the management
    /// port to the allocator. Idempotent; the first caller wins.
    pub fn close(&self) {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.entries.clear();
            self.ports.release(self.port);
            debug!("management namespace [{}] closed", self.name);
        }
    }
}

impl Drop for Namespace {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespace")
            .field("name", &self.name)
            .field("port", &self.port)
            .field("entries", &self.entries.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
