use crate::host::Host;
use std::sync::{Arc, Mutex};

/// One priority level's hosts, partitioned by health.
///
/// Produced by the membership collaborator (health checking itself is
/// not this crate's concern); consumed read-only by the refresh
/// orchestrator.
#[derive(Debug, Clone, Default)]
pub struct HostSet {
    /// Every host at this priority, regardless of health.
    pub hosts: Vec<Arc<Host>>,
    pub healthy_hosts: Vec<Arc<Host>>,
    pub degraded_hosts: Vec<Arc<Host>>,
}

impl HostSet {
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

type UpdateCallback = Box<dyn Fn() + Send>;

/// Ordered per-priority host sets plus membership-change notification.
///
/// All mutation happens on the control thread; callbacks fire
/// synchronously on the thread calling `update_hosts`.
#[derive(Default)]
pub struct PrioritySet {
    host_sets: Mutex<Vec<HostSet>>,
    callbacks: Mutex<Vec<UpdateCallback>>,
}

impl PrioritySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current host sets, ordered by priority.
    pub fn host_sets(&self) -> Vec<HostSet> {
        self.host_sets.lock().expect("priority set poisoned").clone()
    }

    /// Registers a membership-change callback. Control thread only.
    pub fn on_update(&self, callback: impl Fn() + Send + 'static) {
        self.callbacks
            .lock()
            .expect("priority set poisoned")
            .push(Box::new(callback));
    }

    /// Replaces one priority's host set, growing the priority range if
    /// needed, then notifies subscribers.
    pub fn update_hosts(&self, priority: usize, host_set: HostSet) {
        {
            let mut host_sets = self.host_sets.lock().expect("priority set poisoned");
            if host_sets.len() <= priority {
                host_sets.resize_with(priority + 1, HostSet::default);
            }
            host_sets[priority] = host_set;
        }

        // Fired outside the lock so subscribers may read host_sets().
        let callbacks = self.callbacks.lock().expect("priority set poisoned");
        for callback in callbacks.iter() {
            callback();
        }
    }
}

impl std::fmt::Debug for PrioritySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrioritySet")
            .field("priorities", &self.host_sets().len())
            .finish()
    }
}
