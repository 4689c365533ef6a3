//! Capacity pool — the ordered set of servers and their load counters.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use poolshift_core::{Load, ServerIndex};

/// A single server in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub index: ServerIndex,
    /// Number of clients currently bound to this server.
    pub load: Load,
}

impl Server {
    fn new(index: ServerIndex) -> Self {
        Self { index, load: 0 }
    }
}

/// Ordered sequence of servers, indexed by position.
///
/// Never empty: construction requires at least one server and servers are
/// never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityPool {
    servers: Vec<Server>,
}

impl CapacityPool {
    /// Create `server_count` servers, all with load zero.
    pub fn initialize(server_count: NonZeroUsize) -> Self {
        Self {
            servers: (0..server_count.get()).map(Server::new).collect(),
        }
    }

    /// Append a server with load zero and return its index.
    pub fn add_server(&mut self) -> ServerIndex {
        let index = self.servers.len();
        self.servers.push(Server::new(index));
        index
    }

    pub fn size(&self) -> usize {
        self.servers.len()
    }

    pub fn load_of(&self, index: ServerIndex) -> Option<Load> {
        self.servers.get(index).map(|s| s.load)
    }

    /// Overwrite a server's load.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set_load(&mut self, index: ServerIndex, load: Load) {
        self.servers[index].load = load;
    }

    /// Add one client to a server's load and return the new load.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn increment(&mut self, index: ServerIndex) -> Load {
        let server = &mut self.servers[index];
        server.load += 1;
        server.load
    }

    pub fn servers(&self) -> impl Iterator<Item = &Server> {
        self.servers.iter()
    }

    /// Loads in index order.
    pub fn loads(&self) -> Vec<Load> {
        self.servers.iter().map(|s| s.load).collect()
    }

    pub fn total_load(&self) -> u64 {
        self.servers.iter().map(|s| u64::from(s.load)).sum()
    }

    pub fn max_load(&self) -> Load {
        self.servers.iter().map(|s| s.load).max().unwrap_or(0)
    }

    pub fn min_load(&self) -> Load {
        self.servers.iter().map(|s| s.load).min().unwrap_or(0)
    }

    /// Difference between the most and least loaded server.
    pub fn spread(&self) -> Load {
        self.max_load() - self.min_load()
    }
}
