use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod domain;
mod registry;
mod services;

use cli::{Cli, Commands};
use config::Config;

fn init_tracing() {
    // CONNECTOR_DIFF_LOG rather than RUST_LOG; stderr keeps --json stdout clean.
    let filter = EnvFilter::try_from_env("CONNECTOR_DIFF_LOG")
        .unwrap_or_else(|_| EnvFilter::new("connector_diff=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load(&cli.overrides())?;

    match &cli.command {
        Commands::Compare { .. }
        | Commands::Fetch { .. }
        | Commands::Team { .. }
        | Commands::Changes { .. } => commands::handle_runtime_commands(&cli, &config),
        Commands::Auth | Commands::Envs | Commands::Clean => {
            commands::handle_admin_commands(&cli, &config)
        }
    }
}
