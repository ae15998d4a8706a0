use thiserror::Error;

/// Failures detected while activating a cluster's hashing balancer.
///
/// These are all configuration problems: detected once, before any
/// traffic is accepted. The selection hot path never returns errors;
/// "no host" is an `Option::None`.
#[derive(Debug, Error)]
pub enum ActivationError {
    #[error("hash_balance_factor must be 100 or greater, got {factor}")]
    InvalidHashBalanceFactor { factor: u32 },

    #[error("metadata namespace for hash-key overrides must not be empty")]
    EmptyMetadataNamespace,

    #[error("metadata field for hash-key overrides must not be empty")]
    EmptyMetadataField,
}
