use crate::config::ConsistentHashingConfig;
use crate::host::{Host, HostId};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered (host, weight) pairs; weights are normalized to sum to 1
/// across a priority's eligible hosts.
pub type NormalizedHostWeightVector = Vec<(Arc<Host>, f64)>;

/// The same data keyed by host identity, for O(1) decorator lookups.
pub type NormalizedHostWeightMap = HashMap<HostId, (Arc<Host>, f64), ahash::RandomState>;

pub fn normalized_weight_map(weights: &NormalizedHostWeightVector) -> NormalizedHostWeightMap {
    let mut map = NormalizedHostWeightMap::default();
    for (host, weight) in weights {
        map.insert(host.id(), (Arc::clone(host), *weight));
    }
    map
}

/// A built consistent-hashing table (ring hash, maglev, ...).
///
/// Tables are immutable once built and safe for unsynchronized
/// concurrent reads. `choose_host(hash, 0)` is deterministic for a
/// fixed table; `attempt > 0` yields a candidate distinct from earlier
/// attempts while the table has enough distinct hosts.
pub trait HashingTable: Send + Sync {
    fn choose_host(&self, hash: u64, attempt: u32) -> Option<Arc<Host>>;
}

/// The external table-builder capability. Concrete algorithms plug in
/// here without touching the decorator or the orchestrator.
pub trait TableBuilder: Send + Sync {
    fn build(
        &self,
        weights: &NormalizedHostWeightVector,
        min_weight: f64,
        max_weight: f64,
    ) -> Arc<dyn HashingTable>;
}

/// Resolves the string a host is hashed under.
///
/// Precedence:
/// 1. Explicit per-host override (string metadata entry)
/// 2. Hostname, when configured and present
/// 3. Network address
///
/// A present-but-non-string override is ignored with a debug log,
/// never an error.
pub fn hash_key<'a>(host: &'a Host, config: &ConsistentHashingConfig) -> &'a str {
    if let Some(value) = host.metadata_value(&config.metadata_namespace, &config.hash_key_field) {
        match value {
            Value::String(key) if !key.is_empty() => return key,
            Value::String(_) => {}
            other => {
                tracing::debug!(
                    host = %host.address(),
                    value = %other,
                    "hash key override must be a string, falling back"
                );
            }
        }
    }

    if config.use_hostname_for_hashing && !host.hostname().is_empty() {
        host.hostname()
    } else {
        host.address()
    }
}
