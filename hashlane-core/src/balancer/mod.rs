pub mod bounded_load;
pub mod hashing;
pub mod host_map;
mod orchestrator;
pub mod priority;
mod selector;
mod snapshot;

#[cfg(test)]
mod tests;

pub use orchestrator::ThreadAwareBalancer;
pub use selector::*;
pub use snapshot::*;
