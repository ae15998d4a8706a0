use super::support::{RecordingBuilder, balancer_with, healthy_set, host};
use crate::balancer::ThreadAwareBalancer;
use crate::balancer::hashing::TableBuilder;
use crate::balancer::priority::DefaultPrioritySelector;
use crate::config::ConsistentHashingConfig;
use crate::error::ActivationError;
use crate::membership::{HostSet, PrioritySet};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn empty_priorities_get_panic_and_no_table() {
    let priority_set = Arc::new(PrioritySet::new());
    priority_set.update_hosts(
        0,
        healthy_set(&[host("10.0.0.1:80", 1), host("10.0.0.2:80", 1)]),
    );
    priority_set.update_hosts(1, HostSet::default());
    priority_set.update_hosts(2, HostSet::default());

    let (balancer, _) = balancer_with(&priority_set, ConsistentHashingConfig::default());
    let selector = balancer.factory().create();
    let snapshot = selector.snapshot();

    assert_eq!(snapshot.per_priority_states.len(), 3);

    assert!(snapshot.per_priority_states[0].table.is_some());
    assert!(!snapshot.per_priority_states[0].global_panic);

    for priority in 1..3 {
        assert!(snapshot.per_priority_states[priority].table.is_none());
        assert!(snapshot.per_priority_states[priority].global_panic);
    }

    assert_eq!(snapshot.healthy_load, vec![100, 0, 0]);
    assert_eq!(snapshot.degraded_load, vec![0, 0, 0]);
}

#[test]
fn weights_are_normalized_and_extremes_reported() {
    let priority_set = Arc::new(PrioritySet::new());
    priority_set.update_hosts(
        0,
        healthy_set(&[
            host("10.0.0.1:80", 1),
            host("10.0.0.2:80", 1),
            host("10.0.0.3:80", 2),
        ]),
    );

    let (_balancer, builder) = balancer_with(&priority_set, ConsistentHashingConfig::default());

    let builds = builder.builds.lock().expect("builder lock");
    assert_eq!(builds.len(), 1);

    let call = &builds[0];
    assert_eq!(call.weights, vec![0.25, 0.25, 0.5]);
    assert_eq!(call.min_weight, 0.25);
    assert_eq!(call.max_weight, 0.5);
    assert_eq!(
        call.addresses,
        vec!["10.0.0.1:80", "10.0.0.2:80", "10.0.0.3:80"]
    );
}

#[test]
fn membership_update_publishes_a_new_epoch() {
    let priority_set = Arc::new(PrioritySet::new());
    priority_set.update_hosts(0, healthy_set(&[host("10.0.0.1:80", 1)]));

    let (balancer, builder) = balancer_with(&priority_set, ConsistentHashingConfig::default());
    let factory = balancer.factory();

    let before = factory.create();
    assert_eq!(before.snapshot().epoch, 1);

    priority_set.update_hosts(
        0,
        healthy_set(&[host("10.0.0.1:80", 1), host("10.0.0.9:80", 1)]),
    );

    let after = factory.create();
    assert_eq!(after.snapshot().epoch, 2);
    assert_eq!(builder.builds.lock().expect("builder lock").len(), 2);
}

#[test]
fn degraded_hosts_are_eligible_without_panic() {
    let degraded = host("10.0.0.1:80", 1);
    let priority_set = Arc::new(PrioritySet::new());
    priority_set.update_hosts(
        0,
        HostSet {
            hosts: vec![Arc::clone(&degraded)],
            healthy_hosts: vec![],
            degraded_hosts: vec![Arc::clone(&degraded)],
        },
    );

    let (balancer, _) = balancer_with(&priority_set, ConsistentHashingConfig::default());
    let snapshot = balancer.factory().create().snapshot().clone();

    assert!(snapshot.per_priority_states[0].table.is_some());
    assert!(!snapshot.per_priority_states[0].global_panic);
    assert_eq!(snapshot.healthy_load, vec![0]);
    assert_eq!(snapshot.degraded_load, vec![100]);
}

#[test]
fn all_hosts_fallback_sets_the_panic_flag() {
    let priority_set = Arc::new(PrioritySet::new());
    priority_set.update_hosts(
        0,
        HostSet {
            hosts: vec![host("10.0.0.1:80", 1), host("10.0.0.2:80", 1)],
            healthy_hosts: vec![],
            degraded_hosts: vec![],
        },
    );

    let (balancer, builder) = balancer_with(&priority_set, ConsistentHashingConfig::default());
    let snapshot = balancer.factory().create().snapshot().clone();

    // Panic builds a table over every host rather than dropping traffic.
    assert!(snapshot.per_priority_states[0].table.is_some());
    assert!(snapshot.per_priority_states[0].global_panic);
    assert_eq!(snapshot.healthy_load, vec![100]);

    let builds = builder.builds.lock().expect("builder lock");
    assert_eq!(builds[0].addresses.len(), 2);
}

#[test]
fn partial_health_splits_load_across_priorities() {
    let priority_set = Arc::new(PrioritySet::new());

    let (a, b) = (host("10.0.0.1:80", 1), host("10.0.0.2:80", 1));
    priority_set.update_hosts(
        0,
        HostSet {
            hosts: vec![Arc::clone(&a), Arc::clone(&b)],
            healthy_hosts: vec![Arc::clone(&a)],
            degraded_hosts: vec![],
        },
    );
    priority_set.update_hosts(1, healthy_set(&[host("10.0.1.1:80", 1)]));

    let (balancer, _) = balancer_with(&priority_set, ConsistentHashingConfig::default());
    let snapshot = balancer.factory().create().snapshot().clone();

    assert_eq!(snapshot.healthy_load, vec![50, 50]);
    assert_eq!(snapshot.degraded_load, vec![0, 0]);
}

#[test]
fn empty_priority_zero_cedes_all_load_to_priority_one() {
    let priority_set = Arc::new(PrioritySet::new());
    priority_set.update_hosts(0, HostSet::default());
    priority_set.update_hosts(1, healthy_set(&[host("10.0.1.1:80", 1)]));

    let (balancer, _) = balancer_with(&priority_set, ConsistentHashingConfig::default());
    let snapshot = balancer.factory().create().snapshot().clone();

    assert_eq!(snapshot.healthy_load, vec![0, 100]);
    assert_eq!(snapshot.degraded_load, vec![0, 0]);
    assert!(snapshot.per_priority_states[0].table.is_none());
    assert!(snapshot.per_priority_states[1].table.is_some());
}

#[test]
fn fully_empty_membership_parks_load_on_panicked_priority_zero() {
    let priority_set = Arc::new(PrioritySet::new());
    priority_set.update_hosts(0, HostSet::default());
    priority_set.update_hosts(1, HostSet::default());

    let (balancer, _) = balancer_with(&priority_set, ConsistentHashingConfig::default());
    let snapshot = balancer.factory().create().snapshot().clone();

    // Nothing is available anywhere: the full load sits at priority 0,
    // paired with its panic flag and absent table.
    assert_eq!(snapshot.healthy_load, vec![100, 0]);
    assert_eq!(snapshot.degraded_load, vec![0, 0]);
    assert!(snapshot.per_priority_states[0].global_panic);
    assert!(snapshot.per_priority_states[0].table.is_none());
}

#[test]
fn zero_weight_hosts_are_excluded_from_the_table() {
    let priority_set = Arc::new(PrioritySet::new());
    priority_set.update_hosts(
        0,
        healthy_set(&[host("10.0.0.1:80", 0), host("10.0.0.2:80", 1)]),
    );

    let (_balancer, builder) = balancer_with(&priority_set, ConsistentHashingConfig::default());

    let builds = builder.builds.lock().expect("builder lock");
    assert_eq!(builds[0].addresses, vec!["10.0.0.2:80"]);
    assert_eq!(builds[0].weights, vec![1.0]);
}

#[test]
fn invalid_slack_factor_is_fatal_at_activation() {
    let priority_set = Arc::new(PrioritySet::new());
    priority_set.update_hosts(0, healthy_set(&[host("10.0.0.1:80", 1)]));

    let builder = Arc::new(RecordingBuilder::default());
    let balancer = ThreadAwareBalancer::new(
        priority_set,
        builder as Arc<dyn TableBuilder>,
        Arc::new(DefaultPrioritySelector),
        ConsistentHashingConfig {
            hash_balance_factor: 99,
            ..Default::default()
        },
    );

    assert!(matches!(
        balancer.initialize(),
        Err(ActivationError::InvalidHashBalanceFactor { factor: 99 })
    ));
}
