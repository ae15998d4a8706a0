use crate::balancer::bounded_load::BoundedLoadTable;
use crate::balancer::hashing::{HashingTable, NormalizedHostWeightVector, TableBuilder};
use crate::balancer::host_map::{CrossPriorityHostMap, build_host_map};
use crate::balancer::priority::PrioritySelector;
use crate::balancer::selector::SelectorFactory;
use crate::balancer::snapshot::{LbSnapshot, PerPriorityState, PriorityLoad};
use crate::config::ConsistentHashingConfig;
use crate::error::ActivationError;
use crate::host::Host;
use crate::membership::{HostSet, PrioritySet};
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// The two independently-published views a worker captures: the
/// hashing snapshot and the cross-priority host map. Each swap point
/// is its own serialization point; readers may observe one updated
/// before the other within a membership event.
pub(crate) struct PublishedState {
    pub(crate) snapshot: ArcSwap<LbSnapshot>,
    pub(crate) host_map: ArcSwap<CrossPriorityHostMap>,
}

/// Control-thread orchestrator keeping the published hashing snapshot
/// consistent with cluster membership.
///
/// `refresh` runs strictly on the control thread, once per membership
/// notification, never concurrently with itself. All table
/// construction happens outside the publication point; publishing is
/// a single O(1) pointer swap, so slow rebuilds never stall readers.
pub struct ThreadAwareBalancer {
    core: Arc<Core>,
}

struct Core {
    priority_set: Arc<PrioritySet>,
    table_builder: Arc<dyn TableBuilder>,
    priority_selector: Arc<dyn PrioritySelector>,
    config: ConsistentHashingConfig,
    epoch: AtomicU64,
    published: Arc<PublishedState>,
}

impl ThreadAwareBalancer {
    pub fn new(
        priority_set: Arc<PrioritySet>,
        table_builder: Arc<dyn TableBuilder>,
        priority_selector: Arc<dyn PrioritySelector>,
        config: ConsistentHashingConfig,
    ) -> Self {
        Self {
            core: Arc::new(Core {
                priority_set,
                table_builder,
                priority_selector,
                config,
                epoch: AtomicU64::new(0),
                published: Arc::new(PublishedState {
                    snapshot: ArcSwap::from_pointee(LbSnapshot::default()),
                    host_map: ArcSwap::from_pointee(CrossPriorityHostMap::default()),
                }),
            }),
        }
    }

    /// Validates configuration, subscribes to membership changes, and
    /// runs one synchronous rebuild before any traffic is accepted.
    /// A failure here is fatal to cluster activation. Call once.
    pub fn initialize(&self) -> Result<(), ActivationError> {
        self.core.config.validate()?;

        let core = Arc::clone(&self.core);
        self.core.priority_set.on_update(move || {
            core.refresh();
            core.update_cross_priority_host_map();
        });

        self.core.refresh();
        self.core.update_cross_priority_host_map();
        Ok(())
    }

    /// Handle workers use to capture per-epoch selectors.
    pub fn factory(&self) -> SelectorFactory {
        SelectorFactory::new(
            Arc::clone(&self.core.published),
            Arc::clone(&self.core.priority_selector),
        )
    }
}

impl Core {
    /// Rebuilds every priority's hashing state and publishes a new
    /// snapshot. Control thread only.
    fn refresh(&self) {
        let host_sets = self.priority_set.host_sets();
        let epoch = self.epoch.fetch_add(1, Ordering::Relaxed) + 1;

        let per_priority_states: Vec<PerPriorityState> = host_sets
            .iter()
            .enumerate()
            .map(|(priority, host_set)| self.rebuild_priority(priority, host_set))
            .collect();

        let (healthy_load, degraded_load) = recompute_load_split(&host_sets);

        tracing::debug!(
            epoch,
            priorities = per_priority_states.len(),
            "publishing rebuilt hashing snapshot"
        );

        // O(1) publication: everything above happened outside it.
        self.published.snapshot.store(Arc::new(LbSnapshot {
            epoch,
            per_priority_states,
            healthy_load,
            degraded_load,
        }));
    }

    fn rebuild_priority(&self, priority: usize, host_set: &HostSet) -> PerPriorityState {
        let (eligible, global_panic) = eligible_hosts(host_set);
        if eligible.is_empty() {
            tracing::debug!(priority, "priority has no hosts");
            return PerPriorityState {
                table: None,
                global_panic: true,
            };
        }
        if global_panic {
            tracing::warn!(
                priority,
                "no healthy or degraded hosts, serving across all hosts"
            );
        }

        let weights = normalize_weights(&eligible);
        if weights.is_empty() {
            return PerPriorityState {
                table: None,
                global_panic: true,
            };
        }

        let (mut min_weight, mut max_weight) = (1.0f64, 0.0f64);
        for (_, weight) in &weights {
            min_weight = min_weight.min(*weight);
            max_weight = max_weight.max(*weight);
        }

        let table = self.table_builder.build(&weights, min_weight, max_weight);
        let table: Arc<dyn HashingTable> = if self.config.bounding_enabled() {
            Arc::new(BoundedLoadTable::new(
                table,
                &weights,
                self.config.hash_balance_factor,
            ))
        } else {
            table
        };

        PerPriorityState {
            table: Some(table),
            global_panic,
        }
    }

    /// Rebuilds the cross-priority host map under its own publication
    /// point, decoupled from the snapshot so cheap direct lookups are
    /// never serialized behind a table rebuild.
    fn update_cross_priority_host_map(&self) {
        let host_sets = self.priority_set.host_sets();
        self.published
            .host_map
            .store(Arc::new(build_host_map(&host_sets)));
    }
}

/// Healthy → degraded → all-hosts fallback. The returned flag marks a
/// global-panic priority: its table spans every host ignoring health,
/// so traffic is degraded rather than dropped outright.
fn eligible_hosts(host_set: &HostSet) -> (Vec<Arc<Host>>, bool) {
    if !host_set.healthy_hosts.is_empty() {
        return (host_set.healthy_hosts.clone(), false);
    }
    if !host_set.degraded_hosts.is_empty() {
        return (host_set.degraded_hosts.clone(), false);
    }
    (host_set.hosts.clone(), true)
}

/// Normalizes configured weights to sum to 1. Zero-weight hosts are
/// excluded; an all-zero set normalizes to empty.
fn normalize_weights(hosts: &[Arc<Host>]) -> NormalizedHostWeightVector {
    let total: u64 = hosts.iter().map(|host| u64::from(host.weight())).sum();
    if total == 0 {
        return Vec::new();
    }

    hosts
        .iter()
        .filter(|host| host.weight() > 0)
        .map(|host| {
            (
                Arc::clone(host),
                f64::from(host.weight()) / total as f64,
            )
        })
        .collect()
}

/// Splits 100 traffic points across priorities: healthy availability
/// absorbs first-fit in priority order, degraded fills what healthy
/// leaves, and any remainder tops up the first priority already
/// carrying traffic (or priority 0 when nothing is available at all).
fn recompute_load_split(host_sets: &[HostSet]) -> (PriorityLoad, PriorityLoad) {
    let mut healthy_load = vec![0u32; host_sets.len()];
    let mut degraded_load = vec![0u32; host_sets.len()];
    let mut remaining = 100u32;

    for (priority, host_set) in host_sets.iter().enumerate() {
        if remaining == 0 || host_set.hosts.is_empty() {
            continue;
        }
        let availability =
            (host_set.healthy_hosts.len() * 100 / host_set.hosts.len()) as u32;
        healthy_load[priority] = availability.min(remaining);
        remaining -= healthy_load[priority];
    }

    for (priority, host_set) in host_sets.iter().enumerate() {
        if remaining == 0 || host_set.hosts.is_empty() {
            continue;
        }
        let availability =
            (host_set.degraded_hosts.len() * 100 / host_set.hosts.len()) as u32;
        degraded_load[priority] = availability.min(remaining);
        remaining -= degraded_load[priority];
    }

    if remaining > 0 {
        if let Some(load) = healthy_load.iter_mut().find(|load| **load > 0) {
            *load += remaining;
        } else if let Some(load) = degraded_load.iter_mut().find(|load| **load > 0) {
            *load += remaining;
        } else if let Some(first) = healthy_load.first_mut() {
            // Nothing is available anywhere; pair full load with the
            // panic flag at priority 0.
            *first = 100;
        }
    }

    (healthy_load, degraded_load)
}
