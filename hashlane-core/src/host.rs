use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

/// Host identity: the network address string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostId(pub String);

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse per-host health, as reported by the membership collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthFlag {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthFlag {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => HealthFlag::Healthy,
            1 => HealthFlag::Degraded,
            _ => HealthFlag::Unhealthy,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            HealthFlag::Healthy => 0,
            HealthFlag::Degraded => 1,
            HealthFlag::Unhealthy => 2,
        }
    }
}

/// An upstream endpoint.
///
/// The configured weight and metadata are immutable for the lifetime of
/// the host. Health and the active-request counter are live: written by
/// the membership collaborator and `RequestGuard` respectively, read
/// lock-free from the selection path.
#[derive(Debug)]
pub struct Host {
    hostname: String,
    address: String,
    weight: u32,
    metadata: Map<String, Value>,
    health: AtomicU8,
    active_requests: AtomicU32,
}

impl Host {
    pub fn new(hostname: impl Into<String>, address: impl Into<String>, weight: u32) -> Self {
        Self {
            hostname: hostname.into(),
            address: address.into(),
            weight,
            metadata: Map::new(),
            health: AtomicU8::new(HealthFlag::Healthy.as_u8()),
            active_requests: AtomicU32::new(0),
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn id(&self) -> HostId {
        HostId(self.address.clone())
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Looks up a metadata entry under `namespace.key`, if present.
    pub fn metadata_value(&self, namespace: &str, key: &str) -> Option<&Value> {
        self.metadata.get(namespace)?.get(key)
    }

    pub fn health(&self) -> HealthFlag {
        HealthFlag::from_u8(self.health.load(Ordering::Relaxed))
    }

    pub fn set_health(&self, health: HealthFlag) {
        self.health.store(health.as_u8(), Ordering::Relaxed);
    }

    /// Live in-flight request count. Transient staleness is fine: this
    /// is a soft fairness signal, not an admission gate.
    pub fn active_requests(&self) -> u32 {
        self.active_requests.load(Ordering::Relaxed)
    }

    fn on_request_start(&self) {
        self.active_requests.fetch_add(1, Ordering::Relaxed);
    }

    fn on_request_end(&self) {
        // Saturating decrement: never publishes a wrapped value to
        // concurrent readers, never clobbers a concurrent increment.
        let _ = self
            .active_requests
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_sub(1)
            });
    }
}

/// RAII accounting for one proxied request against one host.
#[derive(Debug)]
pub struct RequestGuard {
    host: Arc<Host>,
    finished: bool,
}

impl RequestGuard {
    pub fn new(host: Arc<Host>) -> Self {
        host.on_request_start();
        Self {
            host,
            finished: false,
        }
    }

    pub fn complete(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.host.on_request_end();
        self.finished = true;
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        if !self.finished {
            // Anything that unwinds or returns early past the caller's
            // completion call ends up here; the count must still drop.
            tracing::warn!(
                host = %self.host.address,
                "request guard dropped without explicit completion"
            );
            self.finish();
        }
    }
}
