//! Decisim CLI - command-line operations for the decision-risk engine.
//!
//! # Commands
//!
//! - `decisim run --config <file>` - Execute a simulation run
//! - `decisim tornado --config <file> --option <id>` - Rank variable impact
//! - `decisim stress --config <file>` - Run the stress preset sweep
//!
//! # Architecture
//!
//! As the service layer, this crate orchestrates the core, engine and risk
//! layers behind a unified command-line interface; all numerical work lives
//! below it.

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Decision-risk simulation CLI
#[derive(Parser)]
#[command(name = "decisim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a simulation run and print metrics
    Run {
        /// Path to a TOML run configuration
        #[arg(short, long)]
        config: String,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Also print the persisted snapshot for this decision id
        #[arg(short, long)]
        decision_id: Option<String>,
    },

    /// Rank scenario variables by impact on one option
    Tornado {
        /// Path to a TOML run configuration
        #[arg(short, long)]
        config: String,

        /// Option to attribute variance for
        #[arg(short, long)]
        option: String,

        /// Attribution method (rank, one-at-a-time)
        #[arg(short, long, default_value = "rank")]
        method: String,

        /// Location bump in spreads for one-at-a-time re-runs
        #[arg(short, long, default_value = "1.0")]
        bump: f64,
    },

    /// Run the stress preset sweep against the configuration
    Stress {
        /// Path to a TOML run configuration
        #[arg(short, long)]
        config: String,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialise tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Run {
            config,
            format,
            decision_id,
        } => commands::run::run(&config, &format, decision_id.as_deref()),
        Commands::Tornado {
            config,
            option,
            method,
            bump,
        } => commands::tornado::run(&config, &option, &method, bump),
        Commands::Stress { config } => commands::stress::run(&config),
    }
}
