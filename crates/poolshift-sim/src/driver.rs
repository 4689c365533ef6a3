//! Simulation driver — the per-client placement loop.
//!
//! ```text
//! Idle ──start──▶ Placing ──(overload)──▶ Rebalancing ──▶ Placing ── … ──▶ Done
//! ```
//!
//! The driver is the only writer of pool and client state. Observers are
//! notified synchronously through an [`EventSink`] after each change.

use tracing::{debug, info, warn};

use poolshift_core::{ClientId, ConfigResult, ServerIndex, SimulationConfig, SimulationSection};

use crate::assignment::AssignmentLog;
use crate::detector::{is_overloaded, overloaded_servers};
use crate::events::{EventSink, SimEvent};
use crate::policy::{AssignmentPolicy, LeastLoaded, assign};
use crate::pool::CapacityPool;
use crate::rebalancer::{RebalanceOutcome, Rebalancer};
use crate::report::SimulationReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing instantiated yet.
    Idle,
    /// Placing clients one at a time.
    Placing,
    /// Provisioning and redistributing after an overload.
    Rebalancing,
    /// Every client has been placed.
    Done,
}

/// Result of a single [`Simulation::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// `start` has not been called.
    NotStarted,
    /// One client was placed, possibly followed by a rebalance.
    Placed {
        client: ClientId,
        server: ServerIndex,
        rebalance: Option<RebalanceOutcome>,
    },
    /// All clients are placed; nothing left to do.
    Completed,
}

/// State that exists only while a run is in progress or finished.
#[derive(Debug)]
pub(crate) struct Run {
    pub(crate) pool: CapacityPool,
    pub(crate) log: AssignmentLog,
    pub(crate) rebalancer: Rebalancer,
    pub(crate) next_client: ClientId,
    pub(crate) events_emitted: usize,
}

impl Run {
    fn new(config: &SimulationConfig) -> Self {
        Self {
            pool: CapacityPool::initialize(config.initial_server_count),
            log: AssignmentLog::new(config.total_clients),
            rebalancer: Rebalancer::new(),
            next_client: 0,
            events_emitted: 0,
        }
    }

    fn emit<S: EventSink + ?Sized>(&mut self, sink: &mut S, event: SimEvent) {
        self.events_emitted += 1;
        sink.emit(event);
    }
}

#[derive(Debug)]
pub struct Simulation<P = LeastLoaded> {
    config: SimulationConfig,
    policy: P,
    phase: Phase,
    run: Option<Run>,
}

impl Simulation<LeastLoaded> {
    /// Create an idle simulation using least-loaded assignment.
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_policy(config, LeastLoaded)
    }

    /// Validate a raw `[simulation]` table and create an idle simulation.
    ///
    /// Invalid configuration is rejected here, before any state exists.
    pub fn from_section(section: &SimulationSection) -> ConfigResult<Self> {
        Ok(Self::new(section.validate()?))
    }
}

impl<P: AssignmentPolicy> Simulation<P> {
    pub fn with_policy(config: SimulationConfig, policy: P) -> Self {
        Self {
            config,
            policy,
            phase: Phase::Idle,
            run: None,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The capacity pool, once started.
    pub fn pool(&self) -> Option<&CapacityPool> {
        self.run.as_ref().map(|r| &r.pool)
    }

    /// Client bindings and assignment events, once started.
    pub fn assignments(&self) -> Option<&AssignmentLog> {
        self.run.as_ref().map(|r| &r.log)
    }

    /// Summary of the run, available once it is done.
    pub fn report(&self) -> Option<SimulationReport> {
        match (&self.run, self.phase) {
            (Some(run), Phase::Done) => Some(SimulationReport::capture(&self.config, run)),
            _ => None,
        }
    }

    /// Discard all run state and return to `Idle`.
    pub fn reset(&mut self) {
        self.run = None;
        self.phase = Phase::Idle;
    }

    /// Reset and instantiate servers and clients, ready for stepping.
    ///
    /// Calling this again restarts from scratch; the same configuration
    /// always produces the same event sequence.
    pub fn start<S: EventSink + ?Sized>(&mut self, sink: &mut S) {
        let run = self.begin(sink);
        self.run = Some(run);
    }

    /// Place the next client, then check for overload and rebalance.
    pub fn step<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> StepOutcome {
        let Some(mut run) = self.run.take() else {
            return StepOutcome::NotStarted;
        };
        let outcome = self.advance(&mut run, sink);
        self.run = Some(run);
        outcome
    }

    /// Run from a fresh start to completion.
    pub fn run<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> SimulationReport {
        let mut run = self.begin(sink);
        while let StepOutcome::Placed { .. } = self.advance(&mut run, sink) {}
        let report = SimulationReport::capture(&self.config, &run);
        self.run = Some(run);
        report
    }

    fn begin<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Run {
        self.reset();

        let mut run = Run::new(&self.config);
        self.phase = Phase::Placing;

        info!(
            servers = run.pool.size(),
            clients = self.config.total_clients,
            max_load = self.config.max_load_threshold,
            policy = self.policy.name(),
            "simulation started"
        );
        run.emit(
            sink,
            SimEvent::SimulationStarted {
                servers: run.pool.size(),
                clients: self.config.total_clients,
            },
        );

        self.finish_if_exhausted(&mut run, sink);
        run
    }

    fn advance<S: EventSink + ?Sized>(&mut self, run: &mut Run, sink: &mut S) -> StepOutcome {
        match self.phase {
            Phase::Idle => return StepOutcome::NotStarted,
            Phase::Done => return StepOutcome::Completed,
            Phase::Placing | Phase::Rebalancing => {}
        }

        let client = run.next_client;
        let server = assign(&self.policy, client, &mut run.pool, &mut run.log);
        run.next_client += 1;

        run.emit(sink, SimEvent::ClientAssigned { client, server });
        if let Some(load) = run.pool.load_of(server) {
            run.emit(sink, SimEvent::LoadChanged { server, load });
        }

        // One check per arrival; the triggering client is never retried.
        let threshold = self.config.max_load_threshold;
        let rebalance = if is_overloaded(&run.pool, threshold) {
            Some(self.rebalance(run, sink, client))
        } else {
            None
        };

        self.finish_if_exhausted(run, sink);

        StepOutcome::Placed {
            client,
            server,
            rebalance,
        }
    }

    fn rebalance<S: EventSink + ?Sized>(
        &mut self,
        run: &mut Run,
        sink: &mut S,
        client: ClientId,
    ) -> RebalanceOutcome {
        let threshold = self.config.max_load_threshold;
        let overloaded = overloaded_servers(&run.pool, threshold);
        warn!(
            client,
            servers = ?overloaded,
            threshold,
            "overload detected"
        );
        run.emit(sink, SimEvent::OverloadDetected { servers: overloaded });

        self.phase = Phase::Rebalancing;
        let outcome = run.rebalancer.rebalance(&mut run.pool, &mut run.log);

        run.emit(sink, SimEvent::ServerAdded { server: outcome.added });
        for (server, &load) in outcome.loads.iter().enumerate() {
            run.emit(sink, SimEvent::LoadChanged { server, load });
        }
        for event in &outcome.reassignments {
            run.emit(
                sink,
                SimEvent::ClientAssigned {
                    client: event.client,
                    server: event.server,
                },
            );
        }
        run.emit(sink, SimEvent::RebalanceCompleted);

        info!(
            servers = run.pool.size(),
            clients = outcome.clients,
            max_load = run.pool.max_load(),
            min_load = run.pool.min_load(),
            "rebalance completed"
        );
        if is_overloaded(&run.pool, threshold) {
            // Left for the next arrival's check.
            debug!(servers = run.pool.size(), "pool still overloaded after rebalance");
        }

        self.phase = Phase::Placing;
        outcome
    }

    fn finish_if_exhausted<S: EventSink + ?Sized>(&mut self, run: &mut Run, sink: &mut S) {
        if run.next_client < self.config.total_clients {
            return;
        }

        self.phase = Phase::Done;
        run.emit(sink, SimEvent::SimulationCompleted);
        info!(
            servers = run.pool.size(),
            servers_added = run.pool.size() - self.config.initial_server_count.get(),
            rebalances = run.rebalancer.rebalances(),
            "simulation completed"
        );
    }
}
