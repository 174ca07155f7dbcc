//! Command-line driver for the WSN monitoring controller.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wsn_cli::commands::{init, replay, run};
use wsn_cli::WsnConfig;

#[derive(Parser)]
#[command(name = "wsn")]
#[command(about = "WSN - permissioned sensor network monitoring", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "wsn.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Where to write it (defaults to --config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Deploy a controller and run the full monitoring sequence
    Run {
        /// State estimate to record
        #[arg(short, long, default_value_t = run::DEFAULT_ESTIMATE, allow_negative_numbers = true)]
        estimate: i64,

        /// Save the call journal here
        #[arg(short, long)]
        journal: Option<PathBuf>,
    },

    /// Replay a saved journal and print the resulting controller state
    Replay {
        /// Journal file written by `run`
        journal: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Init { output } => {
            let path = output.unwrap_or(cli.config);
            init::run(&path)?;
            println!("Configuration written to {}", path.display());
        }

        Commands::Run { estimate, journal } => {
            let config = WsnConfig::load(&cli.config)?;
            let report = run::run(&config, estimate, journal.as_deref()).await?;
            run::print(&report);
        }

        Commands::Replay { journal } => {
            let snapshots = replay::run(&journal).await?;
            replay::print(&snapshots)?;
        }
    }

    Ok(())
}
