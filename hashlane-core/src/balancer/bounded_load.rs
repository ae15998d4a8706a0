use crate::balancer::hashing::{
    HashingTable, NormalizedHostWeightMap, NormalizedHostWeightVector, normalized_weight_map,
};
use crate::host::Host;
use std::sync::Arc;

/// Bounded-load decorator over a consistent-hashing table.
///
/// Caps each host's share of in-flight requests at
/// `weight * hash_balance_factor / 100` of the cluster total,
/// re-probing the inner table past overloaded candidates. The re-probe
/// logic is independent of the table algorithm, which is why this is a
/// decorator and not a table variant.
///
/// Holds no mutable state beyond the immutable weight map; a pure
/// function of (hash, attempt, observed live load), shareable across
/// threads without synchronization.
pub struct BoundedLoadTable {
    inner: Arc<dyn HashingTable>,
    weights: NormalizedHostWeightMap,
    hash_balance_factor: u32,
}

impl BoundedLoadTable {
    pub fn new(
        inner: Arc<dyn HashingTable>,
        weights: &NormalizedHostWeightVector,
        hash_balance_factor: u32,
    ) -> Self {
        Self {
            inner,
            weights: normalized_weight_map(weights),
            hash_balance_factor,
        }
    }

    /// Ratio of a host's live load to its allowed capacity. Above 1.0
    /// means overloaded.
    ///
    /// Capacity is `ceil(total_load * weight * factor/100)`, floored at
    /// one slot so a zero-traffic cluster never reports overload.
    fn overload_factor(&self, host: &Host, weight: f64) -> f64 {
        let total: u64 = self
            .weights
            .values()
            .map(|(host, _)| u64::from(host.active_requests()))
            .sum();

        let capacity = (total as f64 * weight * f64::from(self.hash_balance_factor) / 100.0)
            .ceil()
            .max(1.0);

        f64::from(host.active_requests()) / capacity
    }
}

impl HashingTable for BoundedLoadTable {
    fn choose_host(&self, hash: u64, attempt: u32) -> Option<Arc<Host>> {
        // Factor 100 means bounding is disabled: pure pass-through.
        if self.hash_balance_factor <= 100 {
            return self.inner.choose_host(hash, attempt);
        }

        // Probe count bounded by distinct host count, guaranteeing
        // termination even on degenerate inner tables.
        let max_attempts = self.weights.len() as u32;
        for probe in 0..max_attempts {
            let candidate = self.inner.choose_host(hash, attempt + probe)?;

            let Some((_, weight)) = self.weights.get(&candidate.id()) else {
                // Inner table returned a host we never weighted; trust it.
                return Some(candidate);
            };

            if self.overload_factor(&candidate, *weight) <= 1.0 {
                return Some(candidate);
            }

            tracing::trace!(
                host = %candidate.address(),
                probe,
                "candidate over its bounded-load capacity, re-probing"
            );
        }

        // Every probe was overloaded. Bounded load is a fairness
        // heuristic, never a reason to refuse a request: fall back to
        // the first-choice candidate.
        self.inner.choose_host(hash, 0)
    }
}
