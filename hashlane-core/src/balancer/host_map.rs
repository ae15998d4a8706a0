use crate::host::{Host, HostId};
use crate::membership::HostSet;
use std::collections::HashMap;
use std::sync::Arc;

/// Direct host-identity lookup spanning every priority, for callers
/// needing address-based selection outside the hash path.
///
/// Rebuilt wholesale on each membership event and published through
/// its own swap point, independent of the hashing snapshot: cheap
/// lookups are never serialized behind a table rebuild.
pub type CrossPriorityHostMap = HashMap<HostId, Arc<Host>, ahash::RandomState>;

pub fn build_host_map(host_sets: &[HostSet]) -> CrossPriorityHostMap {
    let mut map = CrossPriorityHostMap::default();
    for host_set in host_sets {
        for host in &host_set.hosts {
            map.insert(host.id(), Arc::clone(host));
        }
    }
    map
}
