//! Overload detection.

use poolshift_core::{Load, ServerIndex};

use crate::pool::CapacityPool;

/// True iff any server's load strictly exceeds `threshold`.
pub fn is_overloaded(pool: &CapacityPool, threshold: Load) -> bool {
    pool.servers().any(|s| s.load > threshold)
}

/// Indices of the servers whose load strictly exceeds `threshold`.
pub fn overloaded_servers(pool: &CapacityPool, threshold: Load) -> Vec<ServerIndex> {
    pool.servers()
        .filter(|s| s.load > threshold)
        .map(|s| s.index)
        .collect()
}
