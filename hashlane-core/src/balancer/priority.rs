use crate::balancer::snapshot::PriorityLoad;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityHealth {
    Healthy,
    Degraded,
}

/// Priority-selection policy, inherited from the broader load-balancing
/// layer. Given a request hash and the snapshot's load distributions,
/// names the priority that should carry the request.
pub trait PrioritySelector: Send + Sync {
    fn choose_priority(
        &self,
        hash: u64,
        healthy: &PriorityLoad,
        degraded: &PriorityLoad,
    ) -> (usize, PriorityHealth);
}

/// The standard healthy-then-degraded cumulative walk: `hash % 100`
/// lands in a priority's slice of the 0..100 range, healthy slices
/// first. Deterministic per request hash.
#[derive(Debug, Default)]
pub struct DefaultPrioritySelector;

impl PrioritySelector for DefaultPrioritySelector {
    fn choose_priority(
        &self,
        hash: u64,
        healthy: &PriorityLoad,
        degraded: &PriorityLoad,
    ) -> (usize, PriorityHealth) {
        let point = (hash % 100) as u32;
        let mut cumulative = 0u32;

        for (priority, load) in healthy.iter().enumerate() {
            cumulative += load;
            if point < cumulative {
                return (priority, PriorityHealth::Healthy);
            }
        }
        for (priority, load) in degraded.iter().enumerate() {
            cumulative += load;
            if point < cumulative {
                return (priority, PriorityHealth::Degraded);
            }
        }

        // Degenerate distributions (all zero) land on priority 0.
        (0, PriorityHealth::Healthy)
    }
}
