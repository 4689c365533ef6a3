//! Event feed — what observers see of a running simulation.
//!
//! Observers never touch simulation state. They receive events
//! synchronously through an [`EventSink`], either recorded for polling
//! ([`EventLog`]) or forwarded to an async consumer ([`ChannelSink`]).

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use poolshift_core::{ClientId, Load, ServerIndex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    /// A run began with the initial pool and population sizes.
    SimulationStarted { servers: usize, clients: usize },
    /// The rebalancer provisioned a server.
    ServerAdded { server: ServerIndex },
    LoadChanged { server: ServerIndex, load: Load },
    /// Fires on placement and again for every client on redistribution.
    ClientAssigned { client: ClientId, server: ServerIndex },
    /// Servers whose load exceeded the threshold.
    OverloadDetected { servers: Vec<ServerIndex> },
    RebalanceCompleted,
    SimulationCompleted,
}

/// Receives events as the simulation produces them.
pub trait EventSink {
    fn emit(&mut self, event: SimEvent);
}

impl<F: FnMut(SimEvent)> EventSink for F {
    fn emit(&mut self, event: SimEvent) {
        self(event)
    }
}

/// Records every event for later polling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<SimEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SimEvent> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drain events recorded since the last call.
    pub fn poll(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }
}

/// Forwards events into an unbounded tokio channel.
///
/// Sending never blocks, so a slow consumer cannot stall the simulation.
/// Events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SimEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<SimEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink together with its receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SimEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: SimEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!(event = ?e.0, "event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_log_records_in_order() {
        let mut log = EventLog::new();
        log.emit(SimEvent::ServerAdded { server: 4 });
        log.emit(SimEvent::RebalanceCompleted);

        assert_eq!(
            log.events(),
            &[SimEvent::ServerAdded { server: 4 }, SimEvent::RebalanceCompleted]
        );
    }

    #[test]
    fn poll_drains() {
        let mut log = EventLog::new();
        log.emit(SimEvent::SimulationCompleted);

        assert_eq!(log.poll(), vec![SimEvent::SimulationCompleted]);
        assert!(log.is_empty());
    }

    #[test]
    fn closure_sink() {
        let mut seen = 0;
        {
            let mut sink = |_event: SimEvent| seen += 1;
            sink.emit(SimEvent::RebalanceCompleted);
            sink.emit(SimEvent::SimulationCompleted);
        }
        assert_eq!(seen, 2);
    }

    #[test]
    fn serializes_with_event_tag() {
        let json = serde_json::to_value(SimEvent::LoadChanged { server: 1, load: 3 }).unwrap();
        assert_eq!(json["event"], "load_changed");
        assert_eq!(json["server"], 1);
        assert_eq!(json["load"], 3);

        let json = serde_json::to_value(SimEvent::OverloadDetected { servers: vec![0] }).unwrap();
        assert_eq!(json["event"], "overload_detected");
    }

    #[tokio::test]
    async fn channel_sink_delivers() {
        let (mut sink, mut rx) = ChannelSink::channel();
        sink.emit(SimEvent::ClientAssigned { client: 0, server: 0 });
        sink.emit(SimEvent::SimulationCompleted);
        drop(sink);

        assert_eq!(
            rx.recv().await,
            Some(SimEvent::ClientAssigned { client: 0, server: 0 })
        );
        assert_eq!(rx.recv().await, Some(SimEvent::SimulationCompleted));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn channel_sink_tolerates_dropped_receiver() {
        let (mut sink, rx) = ChannelSink::channel();
        drop(rx);
        sink.emit(SimEvent::SimulationCompleted);
    }
}
