//! Rebalancer — provision one server, then redistribute every placed client.
//!
//! Redistribution is a full recompute, not an incremental patch: loads are
//! overwritten with the even partition and every client is re-pointed by
//! cyclic index, superseding all earlier assignment events.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use poolshift_core::{Load, ServerIndex};

use crate::assignment::{AssignmentEvent, AssignmentLog};
use crate::pool::CapacityPool;

/// What a single rebalance did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceOutcome {
    /// Index of the server provisioned for this rebalance.
    pub added: ServerIndex,
    /// Clients that were redistributed.
    pub clients: usize,
    /// Loads after redistribution, in index order.
    pub loads: Vec<Load>,
    /// New bindings, in client order.
    pub reassignments: Vec<AssignmentEvent>,
}

#[derive(Debug, Default)]
pub struct Rebalancer {
    rebalances: u32,
}

impl Rebalancer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rebalances performed since creation.
    pub fn rebalances(&self) -> u32 {
        self.rebalances
    }

    /// Grow the pool by exactly one server and redistribute onto it.
    pub fn rebalance(
        &mut self,
        pool: &mut CapacityPool,
        log: &mut AssignmentLog,
    ) -> RebalanceOutcome {
        let added = pool.add_server();
        info!(server = added, servers = pool.size(), "provisioned server");

        let (loads, reassignments) = Self::redistribute(pool, log);
        self.rebalances += 1;

        RebalanceOutcome {
            added,
            clients: reassignments.len(),
            loads,
            reassignments,
        }
    }

    /// Spread the placed clients evenly over the current pool.
    ///
    /// Client `i` is bound to server `i % m`. Placed clients are always the
    /// prefix `0..n`, so the first `n % m` servers end up with `n / m + 1`
    /// clients and the rest with `n / m`. Loads are rebuilt by counting the
    /// new bindings, which keeps them equal to the bound clients.
    fn redistribute(
        pool: &mut CapacityPool,
        log: &mut AssignmentLog,
    ) -> (Vec<Load>, Vec<AssignmentEvent>) {
        let placed: Vec<_> = log
            .clients()
            .iter()
            .filter(|c| c.server.is_some())
            .map(|c| c.id)
            .collect();
        let n = placed.len();
        let m = pool.size();

        for server in 0..m {
            pool.set_load(server, 0);
        }
        log.supersede();

        let mut reassignments = Vec::with_capacity(n);
        for client in placed {
            let server = client % m;
            pool.increment(server);
            log.record(client, server);
            reassignments.push(AssignmentEvent { client, server });
        }

        debug!(
            clients = n,
            servers = m,
            base = n / m,
            remainder = n % m,
            "redistributed clients"
        );

        (pool.loads(), reassignments)
    }
}
