use std::path::Path;

use anyhow::Context;
use tracing::info;

use poolshift_core::{PacingConfig, PoolshiftConfig, SimulationSection};
use poolshift_sim::{ChannelSink, EventLog, Simulation};

use crate::render::Renderer;

pub async fn run(
    config_path: Option<&Path>,
    overrides: &SimulationSection,
    format: &str,
    pace: bool,
) -> anyhow::Result<()> {
    let file = match config_path {
        Some(path) => PoolshiftConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PoolshiftConfig::default(),
    };
    let mut simulation = resolve(&file, overrides)?;
    let config = *simulation.config();
    info!(
        servers = config.initial_server_count.get(),
        clients = config.total_clients,
        max_load = config.max_load_threshold,
        "configuration loaded"
    );

    match format {
        "json" => {
            let mut events = EventLog::new();
            let report = simulation.run(&mut events);
            let output = serde_json::json!({
                "report": report,
                "events": events.events(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            let pacing = if pace { file.pacing() } else { PacingConfig::none() };
            let (mut sink, rx) = ChannelSink::channel();
            let renderer = tokio::spawn(Renderer::new(config.max_load_threshold, pacing).drain(rx));

            let report = simulation.run(&mut sink);
            // Closing the channel lets the renderer finish.
            drop(sink);
            renderer.await.context("renderer task failed")?;

            println!(
                "{} clients on {} servers ({} added, {} rebalances)",
                report.total_load(),
                report.server_count,
                report.servers_added,
                report.rebalances,
            );
        }
    }

    Ok(())
}

/// Merge flag overrides over the file's `[simulation]` table and build an
/// idle simulation from the result.
fn resolve(file: &PoolshiftConfig, overrides: &SimulationSection) -> anyhow::Result<Simulation> {
    let section = file.simulation_section().merge(overrides);
    Simulation::from_section(&section).context("invalid simulation configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolshift_sim::Phase;

    #[test]
    fn flags_override_file() {
        let file = PoolshiftConfig::parse(
            r#"
[simulation]
initial_server_count = 2
total_clients = 9
"#,
        )
        .unwrap();
        let overrides = SimulationSection {
            total_clients: Some(3),
            ..Default::default()
        };

        let simulation = resolve(&file, &overrides).unwrap();
        assert_eq!(simulation.phase(), Phase::Idle);
        let config = simulation.config();
        assert_eq!(config.initial_server_count.get(), 2);
        assert_eq!(config.total_clients, 3);
        assert_eq!(config.max_load_threshold, 3);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let overrides = SimulationSection {
            initial_server_count: Some(0),
            ..Default::default()
        };
        let err = resolve(&PoolshiftConfig::default(), &overrides).unwrap_err();
        assert!(format!("{err:#}").contains("initial server count"));
    }

    #[tokio::test]
    async fn run_without_pacing_completes() {
        let overrides = SimulationSection {
            initial_server_count: Some(1),
            total_clients: Some(4),
            max_load_threshold: Some(3),
        };
        run(None, &overrides, "text", false).await.unwrap();
        run(None, &overrides, "json", false).await.unwrap();
    }

    #[tokio::test]
    async fn missing_config_file_errors() {
        let err = run(
            Some(Path::new("/nonexistent/poolshift.toml")),
            &SimulationSection::default(),
            "text",
            false,
        )
        .await
        .unwrap_err();
        assert!(format!("{err:#}").contains("loading"));
    }
}
