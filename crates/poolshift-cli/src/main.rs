use std::path::PathBuf;

use clap::{Parser, Subcommand};
use poolshift_core::SimulationSection;

mod commands;
mod render;

#[derive(Parser)]
#[command(
    name = "poolshift",
    about = "poolshift — server pool overload and rebalancing simulator",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and render it.
    ///
    /// Values are read from [simulation] in the config file, then
    /// overridden by flags. Missing values fall back to the defaults
    /// (4 servers, 20 clients, max load 3).
    Run {
        /// Path to a poolshift.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Initial server count
        #[arg(long, allow_negative_numbers = true)]
        servers: Option<i64>,
        /// Total clients to place
        #[arg(long, allow_negative_numbers = true)]
        clients: Option<i64>,
        /// A server is overloaded above this many clients
        #[arg(long, allow_negative_numbers = true)]
        max_load: Option<i64>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Render without pauses
        #[arg(long)]
        no_pace: bool,
    },
    /// Generate a poolshift.toml scaffold with every default spelled out
    Init {
        #[arg(short, long, default_value = ".")]
        path: String,
        /// Overwrite an existing poolshift.toml
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("poolshift=info".parse()?)
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            servers,
            clients,
            max_load,
            format,
            no_pace,
        } => {
            let overrides = SimulationSection {
                max_load_threshold: max_load,
                initial_server_count: servers,
                total_clients: clients,
            };
            commands::run::run(config.as_deref(), &overrides, &format, !no_pace).await
        }
        Commands::Init { path, force } => commands::init::init(&path, force),
    }
}
