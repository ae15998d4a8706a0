use crate::error::ActivationError;
use serde::{Deserialize, Serialize};

/// Default metadata namespace holding per-host overrides.
pub const DEFAULT_METADATA_NAMESPACE: &str = "hashlane.lb";

/// Default metadata field naming a host's explicit hash key.
pub const DEFAULT_HASH_KEY_FIELD: &str = "hash_key";

/// Consistent-hashing knobs, owned by the cluster configuration layer
/// and consumed here read-only.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsistentHashingConfig {
    /// Bounded-load slack, as an integer percentage. 100 disables
    /// bounding; e.g. 150 allows each host 1.5x its fair share of
    /// in-flight requests before re-probing.
    #[serde(default = "default_hash_balance_factor")]
    pub hash_balance_factor: u32,

    /// Hash hosts by hostname instead of address when no explicit
    /// override is present.
    #[serde(default)]
    pub use_hostname_for_hashing: bool,

    #[serde(default = "default_metadata_namespace")]
    pub metadata_namespace: String,

    #[serde(default = "default_hash_key_field")]
    pub hash_key_field: String,
}

fn default_hash_balance_factor() -> u32 {
    100
}

fn default_metadata_namespace() -> String {
    DEFAULT_METADATA_NAMESPACE.to_owned()
}

fn default_hash_key_field() -> String {
    DEFAULT_HASH_KEY_FIELD.to_owned()
}

impl Default for ConsistentHashingConfig {
    fn default() -> Self {
        Self {
            hash_balance_factor: default_hash_balance_factor(),
            use_hostname_for_hashing: false,
            metadata_namespace: default_metadata_namespace(),
            hash_key_field: default_hash_key_field(),
        }
    }
}

impl ConsistentHashingConfig {
    pub fn bounding_enabled(&self) -> bool {
        self.hash_balance_factor > 100
    }

    /// Fail-fast validation, run at cluster activation.
    pub fn validate(&self) -> Result<(), ActivationError> {
        if self.hash_balance_factor < 100 {
            return Err(ActivationError::InvalidHashBalanceFactor {
                factor: self.hash_balance_factor,
            });
        }
        if self.metadata_namespace.is_empty() {
            return Err(ActivationError::EmptyMetadataNamespace);
        }
        if self.hash_key_field.is_empty() {
            return Err(ActivationError::EmptyMetadataField);
        }
        Ok(())
    }
}
