//! Client records and the assignment log.
//!
//! The log is append-only between rebalances. A rebalance supersedes it:
//! the previous events are dropped and the log is re-populated with the
//! redistributed assignments.

use serde::{Deserialize, Serialize};

use poolshift_core::{ClientId, ServerIndex};

/// A client in the fixed population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    /// The server this client is bound to, `None` until placed.
    pub server: Option<ServerIndex>,
}

/// A single (client, server) binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentEvent {
    pub client: ClientId,
    pub server: ServerIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssignmentLog {
    clients: Vec<Client>,
    events: Vec<AssignmentEvent>,
}

impl AssignmentLog {
    /// Create the client population with no assignments.
    pub fn new(total_clients: usize) -> Self {
        Self {
            clients: (0..total_clients)
                .map(|id| Client { id, server: None })
                .collect(),
            events: Vec::new(),
        }
    }

    /// Bind `client` to `server` and append the event.
    ///
    /// # Panics
    ///
    /// Panics if `client` is not part of the population.
    pub fn record(&mut self, client: ClientId, server: ServerIndex) {
        self.clients[client].server = Some(server);
        self.events.push(AssignmentEvent { client, server });
    }

    /// Drop all events ahead of a full re-assignment.
    ///
    /// Client bindings are left in place until they are re-recorded.
    pub fn supersede(&mut self) {
        self.events.clear();
    }

    pub fn server_of(&self, client: ClientId) -> Option<ServerIndex> {
        self.clients.get(client).and_then(|c| c.server)
    }

    /// Number of clients bound to `server`.
    pub fn clients_on(&self, server: ServerIndex) -> usize {
        self.clients
            .iter()
            .filter(|c| c.server == Some(server))
            .count()
    }

    /// Number of clients that have been placed so far.
    pub fn placed_count(&self) -> usize {
        self.clients.iter().filter(|c| c.server.is_some()).count()
    }

    pub fn population(&self) -> usize {
        self.clients.len()
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn events(&self) -> &[AssignmentEvent] {
        &self.events
    }

    /// Current server per client, in client order.
    pub fn assignments(&self) -> Vec<Option<ServerIndex>> {
        self.clients.iter().map(|c| c.server).collect()
    }
}
