use crate::balancer::ThreadAwareBalancer;
use crate::balancer::hashing::{HashingTable, NormalizedHostWeightVector, TableBuilder};
use crate::balancer::priority::DefaultPrioritySelector;
use crate::config::ConsistentHashingConfig;
use crate::host::{Host, RequestGuard};
use crate::membership::{HostSet, PrioritySet};
use std::sync::{Arc, Mutex};

/// Deterministic stand-in for a real ring-hash/maglev table: indexes
/// the host list at (hash + attempt) modulo host count, which keeps
/// the distinct-candidates-per-attempt contract while staying trivial
/// to reason about in assertions.
pub struct ModuloTable {
    pub hosts: Vec<Arc<Host>>,
}

impl HashingTable for ModuloTable {
    fn choose_host(&self, hash: u64, attempt: u32) -> Option<Arc<Host>> {
        if self.hosts.is_empty() {
            return None;
        }
        let index = (hash.wrapping_add(u64::from(attempt)) % self.hosts.len() as u64) as usize;
        Some(Arc::clone(&self.hosts[index]))
    }
}

/// Degenerate table returning one host for every (hash, attempt);
/// exercises probe-exhaustion paths.
pub struct ConstantTable {
    pub host: Arc<Host>,
}

impl HashingTable for ConstantTable {
    fn choose_host(&self, _hash: u64, _attempt: u32) -> Option<Arc<Host>> {
        Some(Arc::clone(&self.host))
    }
}

pub struct BuildCall {
    pub addresses: Vec<String>,
    pub weights: Vec<f64>,
    pub min_weight: f64,
    pub max_weight: f64,
}

/// Table builder that records every build call and hands back a
/// `ModuloTable` over the weighted hosts, in order.
#[derive(Default)]
pub struct RecordingBuilder {
    pub builds: Mutex<Vec<BuildCall>>,
}

impl TableBuilder for RecordingBuilder {
    fn build(
        &self,
        weights: &NormalizedHostWeightVector,
        min_weight: f64,
        max_weight: f64,
    ) -> Arc<dyn HashingTable> {
        self.builds.lock().expect("builder lock").push(BuildCall {
            addresses: weights
                .iter()
                .map(|(host, _)| host.address().to_owned())
                .collect(),
            weights: weights.iter().map(|(_, weight)| *weight).collect(),
            min_weight,
            max_weight,
        });

        Arc::new(ModuloTable {
            hosts: weights.iter().map(|(host, _)| Arc::clone(host)).collect(),
        })
    }
}

pub fn host(address: &str, weight: u32) -> Arc<Host> {
    Arc::new(Host::new("", address, weight))
}

/// A host set whose every member is healthy.
pub fn healthy_set(hosts: &[Arc<Host>]) -> HostSet {
    HostSet {
        hosts: hosts.to_vec(),
        healthy_hosts: hosts.to_vec(),
        degraded_hosts: vec![],
    }
}

/// Pins `count` in-flight requests on a host; drop the guards to
/// release them.
pub fn occupy(host: &Arc<Host>, count: u32) -> Vec<RequestGuard> {
    (0..count)
        .map(|_| RequestGuard::new(Arc::clone(host)))
        .collect()
}

/// An initialized balancer over the given priority set, wired with a
/// `RecordingBuilder` and the default priority selector.
pub fn balancer_with(
    priority_set: &Arc<PrioritySet>,
    config: ConsistentHashingConfig,
) -> (ThreadAwareBalancer, Arc<RecordingBuilder>) {
    let builder = Arc::new(RecordingBuilder::default());
    let balancer = ThreadAwareBalancer::new(
        Arc::clone(priority_set),
        Arc::clone(&builder) as Arc<dyn TableBuilder>,
        Arc::new(DefaultPrioritySelector),
        config,
    );
    balancer.initialize().expect("activation");
    (balancer, builder)
}
