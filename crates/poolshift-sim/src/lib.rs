//! poolshift-sim — client placement over a growing server pool.
//!
//! Places a fixed population of clients one at a time onto the least-loaded
//! server. After every placement the pool is checked for overload; an
//! overloaded pool gains exactly one server and all placed clients are
//! redistributed across it.
//!
//! # Algorithm
//!
//! ```text
//! for client in 0..N:
//!     target = argmin(load), lowest index on ties
//!     load[target] += 1
//!
//!     if any load > max_load_threshold:
//!         add_server()                        // M += 1
//!         base, rem = placed / M, placed % M
//!         load[j] = base + (j < rem)
//!         client i -> server i % M            // full recompute
//! ```
//!
//! Overload is checked once per arrival. A pool that is still overloaded
//! after a rebalance is handled by the check on the next arrival.
//!
//! # Components
//!
//! - **`pool`** — capacity pool (servers and load counters)
//! - **`assignment`** — client records and the assignment log
//! - **`policy`** — least-loaded server selection
//! - **`detector`** — overload detection
//! - **`rebalancer`** — provision + redistribute
//! - **`driver`** — the simulation state machine
//! - **`events`** — event feed for observers

pub mod assignment;
pub mod detector;
pub mod driver;
pub mod events;
pub mod policy;
pub mod pool;
pub mod rebalancer;
pub mod report;

pub use assignment::{AssignmentEvent, AssignmentLog, Client};
pub use detector::{is_overloaded, overloaded_servers};
pub use driver::{Phase, Simulation, StepOutcome};
pub use events::{ChannelSink, EventLog, EventSink, SimEvent};
pub use policy::{AssignmentPolicy, LeastLoaded, assign};
pub use pool::{CapacityPool, Server};
pub use rebalancer::{RebalanceOutcome, Rebalancer};
pub use report::SimulationReport;
