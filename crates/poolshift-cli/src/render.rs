//! Terminal renderer for the simulation event feed.
//!
//! Consumes events from a channel and prints them with the configured
//! pauses. Pacing happens here, after the simulation has already produced
//! its events, so it never affects the outcome.

use std::time::Duration;

use tokio::sync::mpsc;

use poolshift_core::{Load, PacingConfig, ServerIndex, client_label, server_label};
use poolshift_sim::SimEvent;

pub struct Renderer {
    threshold: Load,
    pacing: PacingConfig,
    loads: Vec<Load>,
    rebalancing: bool,
}

impl Renderer {
    pub fn new(threshold: Load, pacing: PacingConfig) -> Self {
        Self {
            threshold,
            pacing,
            loads: Vec::new(),
            rebalancing: false,
        }
    }

    /// Render events until the sending side closes.
    pub async fn drain(mut self, mut rx: mpsc::UnboundedReceiver<SimEvent>) {
        while let Some(event) = rx.recv().await {
            let (lines, pause) = self.apply(&event);
            for line in lines {
                println!("{line}");
            }
            pause_for(pause).await;
        }
    }

    /// Update local view state and return the lines to print and the pause
    /// that follows them.
    fn apply(&mut self, event: &SimEvent) -> (Vec<String>, Duration) {
        match event {
            SimEvent::SimulationStarted { servers, clients } => {
                self.loads = vec![0; *servers];
                self.rebalancing = false;
                let mut lines = vec![format!(
                    "Placing {clients} clients on {servers} servers (max load {})",
                    self.threshold
                )];
                lines.extend(self.server_rows());
                (lines, Duration::ZERO)
            }
            SimEvent::ClientAssigned { client, server } => {
                let line = format!("  {} -> {}", client_label(*client), server_label(*server));
                let pause = if self.rebalancing {
                    self.pacing.reconnect_delay()
                } else {
                    Duration::ZERO
                };
                (vec![line], pause)
            }
            SimEvent::LoadChanged { server, load } => {
                if let Some(slot) = self.loads.get_mut(*server) {
                    *slot = *load;
                }
                if self.rebalancing {
                    (Vec::new(), Duration::ZERO)
                } else {
                    (self.server_rows(), self.pacing.assign_delay())
                }
            }
            SimEvent::OverloadDetected { servers } => {
                self.rebalancing = true;
                let names: Vec<_> = servers.iter().map(|&s| server_label(s)).collect();
                (
                    vec![format!("!! Network overload detected on {}", names.join(", "))],
                    self.pacing.message_delay(),
                )
            }
            SimEvent::ServerAdded { server } => {
                if self.loads.len() <= *server {
                    self.loads.resize(*server + 1, 0);
                }
                (
                    vec![format!("++ Adding new server {}...", server_label(*server))],
                    self.pacing.message_delay(),
                )
            }
            SimEvent::RebalanceCompleted => {
                self.rebalancing = false;
                let mut lines = vec!["== Network load balanced".to_string()];
                lines.extend(self.server_rows());
                (lines, self.pacing.message_delay())
            }
            SimEvent::SimulationCompleted => {
                let mut lines = vec!["Simulation complete".to_string()];
                lines.extend(self.server_rows());
                (lines, Duration::ZERO)
            }
        }
    }

    fn server_rows(&self) -> Vec<String> {
        self.loads
            .iter()
            .enumerate()
            .map(|(i, &load)| server_row(i, load, self.threshold))
            .collect()
    }
}

/// One server as `S1  [###]  3`, flagged when above the threshold.
fn server_row(server: ServerIndex, load: Load, threshold: Load) -> String {
    let bar = "#".repeat(load as usize);
    let flag = if load > threshold { "  OVERLOADED" } else { "" };
    format!("{:<4}[{bar}] {load}{flag}", server_label(server))
}

async fn pause_for(pause: Duration) {
    if !pause.is_zero() {
        tokio::time::sleep(pause).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_row_flags_overload() {
        assert_eq!(server_row(0, 3, 3), "S1  [###] 3");
        assert_eq!(server_row(1, 4, 3), "S2  [####] 4  OVERLOADED");
        assert_eq!(server_row(9, 0, 3), "S10 [] 0");
    }

    #[test]
    fn tracks_loads_and_rebalance_phase() {
        let mut renderer = Renderer::new(3, PacingConfig::default());
        renderer.apply(&SimEvent::SimulationStarted { servers: 1, clients: 4 });

        let (rows, pause) = renderer.apply(&SimEvent::LoadChanged { server: 0, load: 4 });
        assert_eq!(rows, vec!["S1  [####] 4  OVERLOADED"]);
        assert_eq!(pause, Duration::from_millis(300));

        renderer.apply(&SimEvent::OverloadDetected { servers: vec![0] });
        renderer.apply(&SimEvent::ServerAdded { server: 1 });
        let (rows, _) = renderer.apply(&SimEvent::LoadChanged { server: 0, load: 2 });
        assert!(rows.is_empty());
        let (_, pause) = renderer.apply(&SimEvent::ClientAssigned { client: 0, server: 0 });
        assert_eq!(pause, Duration::from_millis(50));
        renderer.apply(&SimEvent::LoadChanged { server: 1, load: 2 });

        let (lines, _) = renderer.apply(&SimEvent::RebalanceCompleted);
        assert_eq!(lines[1..], ["S1  [##] 2", "S2  [##] 2"]);
    }

    #[test]
    fn overload_message_names_servers() {
        let mut renderer = Renderer::new(3, PacingConfig::none());
        let (lines, pause) = renderer.apply(&SimEvent::OverloadDetected { servers: vec![0, 2] });
        assert_eq!(lines, vec!["!! Network overload detected on S1, S3"]);
        assert!(pause.is_zero());
    }

    #[tokio::test]
    async fn drain_stops_when_channel_closes() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(SimEvent::SimulationStarted { servers: 2, clients: 0 }).unwrap();
        tx.send(SimEvent::SimulationCompleted).unwrap();
        drop(tx);

        Renderer::new(3, PacingConfig::none()).drain(rx).await;
    }
}
