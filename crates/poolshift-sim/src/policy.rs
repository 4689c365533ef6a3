//! Assignment policy — picks the server for each arriving client.

use tracing::debug;

use poolshift_core::{ClientId, Load, ServerIndex};

use crate::assignment::AssignmentLog;
use crate::pool::CapacityPool;

/// Strategy for choosing the server that receives the next client.
pub trait AssignmentPolicy {
    /// Select a server. The pool is never empty.
    fn select(&self, pool: &CapacityPool) -> ServerIndex;

    /// Strategy name (for logging).
    fn name(&self) -> &'static str;
}

/// Least-loaded selection with ties going to the lowest index.
///
/// The tie-break is part of the contract: with all servers equally loaded
/// the choice is always index 0, which keeps runs reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastLoaded;

impl AssignmentPolicy for LeastLoaded {
    fn select(&self, pool: &CapacityPool) -> ServerIndex {
        let mut best: Option<(ServerIndex, Load)> = None;
        for server in pool.servers() {
            // Strict comparison keeps the first (lowest) index on ties.
            if best.is_none_or(|(_, load)| server.load < load) {
                best = Some((server.index, server.load));
            }
        }
        best.map(|(index, _)| index).unwrap_or(0)
    }

    fn name(&self) -> &'static str {
        "least-loaded"
    }
}

/// Place `client`: select a server, bump its load, record the binding.
pub fn assign<P: AssignmentPolicy + ?Sized>(
    policy: &P,
    client: ClientId,
    pool: &mut CapacityPool,
    log: &mut AssignmentLog,
) -> ServerIndex {
    let server = policy.select(pool);
    let load = pool.increment(server);
    log.record(client, server);

    debug!(
        client,
        server,
        load,
        policy = policy.name(),
        "client assigned"
    );

    server
}
