//! Shared fixtures for the cross-thread tests: a deterministic table
//! builder standing in for ring-hash/maglev, and membership helpers.

use hashlane_core::balancer::ThreadAwareBalancer;
use hashlane_core::balancer::hashing::{
    HashingTable, NormalizedHostWeightVector, TableBuilder,
};
use hashlane_core::balancer::priority::DefaultPrioritySelector;
use hashlane_core::config::ConsistentHashingConfig;
use hashlane_core::host::Host;
use hashlane_core::membership::{HostSet, PrioritySet};
use std::sync::Arc;

/// Deterministic table: indexes hosts at (hash + attempt) modulo count.
pub struct ModuloTable {
    hosts: Vec<Arc<Host>>,
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

#[derive(Default)]
pub struct ModuloBuilder;

impl TableBuilder for ModuloBuilder {
    fn build(
        &self,
        weights: &NormalizedHostWeightVector,
        _min_weight: f64,
        _max_weight: f64,
    ) -> Arc<dyn HashingTable> {
        Arc::new(ModuloTable {
            hosts: weights.iter().map(|(host, _)| Arc::clone(host)).collect(),
        })
    }
}

pub fn host(address: &str) -> Arc<Host> {
    Arc::new(Host::new("", address, 1))
}

pub fn healthy_set(hosts: &[Arc<Host>]) -> HostSet {
    HostSet {
        hosts: hosts.to_vec(),
        healthy_hosts: hosts.to_vec(),
        degraded_hosts: vec![],
    }
}

/// An activated balancer over the given priority set, with bounding
/// disabled unless a factor is supplied.
pub fn activated_balancer(
    priority_set: &Arc<PrioritySet>,
    hash_balance_factor: u32,
) -> ThreadAwareBalancer {
    let balancer = ThreadAwareBalancer::new(
        Arc::clone(priority_set),
        Arc::new(ModuloBuilder),
        Arc::new(DefaultPrioritySelector),
        ConsistentHashingConfig {
            hash_balance_factor,
            ..Default::default()
        },
    );
    balancer.initialize().expect("activation");
    balancer
}
