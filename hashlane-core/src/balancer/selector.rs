use crate::balancer::host_map::CrossPriorityHostMap;
use crate::balancer::orchestrator::PublishedState;
use crate::balancer::priority::PrioritySelector;
use crate::balancer::snapshot::LbSnapshot;
use crate::ctx::SelectionContext;
use crate::host::{HealthFlag, Host};
use std::sync::Arc;

/// Hands out per-worker selectors bound to the current configuration
/// epoch. `create` is the only synchronization a worker ever touches:
/// two atomic pointer loads. Cloneable; one factory serves all workers.
#[derive(Clone)]
pub struct SelectorFactory {
    published: Arc<PublishedState>,
    priority_selector: Arc<dyn PrioritySelector>,
}

impl SelectorFactory {
    pub(crate) fn new(
        published: Arc<PublishedState>,
        priority_selector: Arc<dyn PrioritySelector>,
    ) -> Self {
        Self {
            published,
            priority_selector,
        }
    }

    /// Captures the current snapshot and host map by shared reference.
    /// The returned selector never re-reads published state: a worker
    /// wanting a newer epoch calls `create` again.
    pub fn create(&self) -> WorkerSelector {
        WorkerSelector {
            snapshot: self.published.snapshot.load_full(),
            host_map: self.published.host_map.load_full(),
            priority_selector: Arc::clone(&self.priority_selector),
        }
    }
}

/// Per-worker, read-only view over one published snapshot.
///
/// Selection is a pure read over immutable shared data: no locks, no
/// blocking, no allocation beyond the returned `Arc` clone. One
/// instance belongs to exactly one worker.
pub struct WorkerSelector {
    snapshot: Arc<LbSnapshot>,
    host_map: Arc<CrossPriorityHostMap>,
    priority_selector: Arc<dyn PrioritySelector>,
}

impl WorkerSelector {
    pub fn choose_host(&self, ctx: &SelectionContext) -> Option<Arc<Host>> {
        if let Some(override_host) = &ctx.override_host {
            match self.host_map.get(&override_host.id) {
                Some(host) if host.health() != HealthFlag::Unhealthy => {
                    return Some(Arc::clone(host));
                }
                _ if override_host.strict => return None,
                _ => {}
            }
        }

        let hash = ctx.hash?;
        let (priority, _) = self.priority_selector.choose_priority(
            hash,
            &self.snapshot.healthy_load,
            &self.snapshot.degraded_load,
        );

        let state = self.snapshot.per_priority_states.get(priority)?;
        if state.global_panic {
            tracing::trace!(priority, "selecting from a global-panic priority");
        }

        state.table.as_ref()?.choose_host(hash, 0)
    }

    /// Proactive selection of a second host ahead of the first being
    /// confirmed is unsupported for hash-based balancing.
    pub fn peek_another_host(&self, _ctx: &SelectionContext) -> Option<Arc<Host>> {
        None
    }

    /// The captured snapshot. Diagnostic surface (epoch, shape).
    pub fn snapshot(&self) -> &Arc<LbSnapshot> {
        &self.snapshot
    }
}
