//! Hent CLI entry point.

use anyhow::Result;
use clap::Parser;
use hent::cli::{commands, Cli, Commands};
use hent::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("hent={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure the workspace root exists
    std::fs::create_dir_all(settings.temp_dir())?;

    // Execute command; plain `hent` serves with the configured address
    match cli.command {
        Some(Commands::Doctor) => {
            commands::run_doctor(&settings)?;
        }

        Some(Commands::Serve { host, port }) => {
            let host = host.unwrap_or_else(|| settings.server.host.clone());
            let port = port.unwrap_or(settings.server.port);
            commands::run_serve(&host, port, settings).await?;
        }

        None => {
            let host = settings.server.host.clone();
            let port = settings.server.port;
            commands::run_serve(&host, port, settings).await?;
        }
    }

    Ok(())
}
