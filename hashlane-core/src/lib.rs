pub mod balancer;
pub mod config;
pub mod ctx;
pub mod error;
pub mod host;
pub mod logging;
pub mod membership;
