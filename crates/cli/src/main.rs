//! SilverCare CLI — the main entry point.
//!
//! Commands:
//! - `serve`   — start the HTTP gateway
//! - `doctor`  — configuration audit + live connectivity probe
//! - `onboard` — write a default silvercare.toml

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "silvercare",
    about = "SilverCare — conversational companion service for elderly users",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration and probe provider connectivity
    Doctor,

    /// Write a default silvercare.toml
    Onboard,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await,
        Commands::Doctor => commands::doctor::run().await,
        Commands::Onboard => commands::onboard::run(),
    }
}
