use crate::host::HostId;

/// Everything the worker selector needs from the request.
///
/// The hash is precomputed upstream by a configurable hash policy
/// (headers, cookies, source IP); its derivation is not this crate's
/// concern. A request with no hash policy match carries `hash: None`
/// and selects nothing.
#[derive(Debug, Clone, Default)]
pub struct SelectionContext {
    pub hash: Option<u64>,
    pub override_host: Option<OverrideHost>,
}

/// A direct host preference, bypassing the hash path.
#[derive(Debug, Clone)]
pub struct OverrideHost {
    pub id: HostId,
    /// When true, an unusable override fails selection instead of
    /// falling back to hashing.
    pub strict: bool,
}

impl SelectionContext {
    pub fn with_hash(hash: u64) -> Self {
        Self {
            hash: Some(hash),
            override_host: None,
        }
    }
}
