use crate::balancer::hashing::HashingTable;
use std::fmt;
use std::sync::Arc;

/// Per-priority traffic share, in integer percent. Healthy and
/// degraded vectors jointly sum to 100 (or 0 while no membership has
/// been seen).
pub type PriorityLoad = Vec<u32>;

/// One priority level's selection state.
///
/// `table` is `None` when the priority had no hosts at the last
/// rebuild. `global_panic` marks a priority whose table was built over
/// all hosts ignoring health, because no healthy or degraded host
/// remained.
#[derive(Clone, Default)]
pub struct PerPriorityState {
    pub table: Option<Arc<dyn HashingTable>>,
    pub global_panic: bool,
}

impl fmt::Debug for PerPriorityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerPriorityState")
            .field("table", &self.table.is_some())
            .field("global_panic", &self.global_panic)
            .finish()
    }
}

/// Immutable, control-plane snapshot of all priorities' hashing state.
///
/// Safe to read from the request hot path. Built and published only by
/// the refresh orchestrator; a new configuration epoch is always a
/// wholly new object. Readers holding an old snapshot keep it valid
/// for as long as they hold the `Arc`.
#[derive(Debug, Default)]
pub struct LbSnapshot {
    /// Rebuild generation, incremented per refresh. Diagnostic only.
    pub epoch: u64,
    pub per_priority_states: Vec<PerPriorityState>,
    pub healthy_load: PriorityLoad,
    pub degraded_load: PriorityLoad,
}
