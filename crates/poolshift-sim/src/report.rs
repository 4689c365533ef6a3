//! Summary of a simulation run.

use serde::{Deserialize, Serialize};

use poolshift_core::{Load, ServerIndex, SimulationConfig};

use crate::driver::Run;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub config: SimulationConfig,
    /// Loads in server index order.
    pub final_loads: Vec<Load>,
    pub server_count: usize,
    /// Servers provisioned by rebalances.
    pub servers_added: usize,
    pub rebalances: u32,
    /// Current server per client, in client order.
    pub assignments: Vec<Option<ServerIndex>>,
    pub events_emitted: usize,
}

impl SimulationReport {
    pub(crate) fn capture(config: &SimulationConfig, run: &Run) -> Self {
        Self {
            config: *config,
            final_loads: run.pool.loads(),
            server_count: run.pool.size(),
            servers_added: run.pool.size() - config.initial_server_count.get(),
            rebalances: run.rebalancer.rebalances(),
            assignments: run.log.assignments(),
            events_emitted: run.events_emitted,
        }
    }

    pub fn total_load(&self) -> u64 {
        self.final_loads.iter().map(|&l| u64::from(l)).sum()
    }

    pub fn spread(&self) -> Load {
        let max = self.final_loads.iter().copied().max().unwrap_or(0);
        let min = self.final_loads.iter().copied().min().unwrap_or(0);
        max - min
    }

    /// Servers still above the threshold at the end of the run.
    pub fn overloaded_servers(&self) -> Vec<ServerIndex> {
        self.final_loads
            .iter()
            .enumerate()
            .filter(|&(_, &load)| load > self.config.max_load_threshold)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::driver::Simulation;
    use crate::events::EventLog;
    use poolshift_core::SimulationConfig;

    #[test]
    fn report_matches_run() {
        let mut sim = Simulation::new(SimulationConfig::new(1, 4, 3).unwrap());
        let mut events = EventLog::new();
        let report = sim.run(&mut events);

        assert_eq!(report.final_loads, vec![2, 2]);
        assert_eq!(report.server_count, 2);
        assert_eq!(report.servers_added, 1);
        assert_eq!(report.rebalances, 1);
        assert_eq!(report.total_load(), 4);
        assert_eq!(report.spread(), 0);
        assert_eq!(report.events_emitted, events.len());
        assert!(report.overloaded_servers().is_empty());
        assert_eq!(sim.report(), Some(report));
    }

    #[test]
    fn report_serializes() {
        let mut sim = Simulation::new(SimulationConfig::new(2, 3, 5).unwrap());
        let report = sim.run(&mut EventLog::new());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["final_loads"], serde_json::json!([2, 1]));
        assert_eq!(json["config"]["initial_server_count"], 2);
        assert_eq!(json["assignments"], serde_json::json!([0, 1, 0]));
    }
}
