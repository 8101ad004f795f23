//! Slotscan CLI - booking availability checker
//!
//! Usage:
//!   slotscan serve              Run the HTTP service
//!   slotscan check <url>        Run one availability check, print JSON

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use slotscan_browser::{checker, BrowserConfig, ChromeProvider};
use slotscan_core::{RetentionPolicy, ScanConfig, SlotStrategy};
use slotscan_server::ServerConfig;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "slotscan")]
#[command(version, about = "Booking availability checker for scheduling pages")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Slot-counting strategy
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// What to do with dates that count zero slots
    #[arg(long, value_enum)]
    retention: Option<RetentionArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Host suffix target URLs must match
        #[arg(long, default_value = "calendly.com")]
        allowed_host: String,
    },

    /// Run one availability check and print the JSON report
    Check {
        /// Scheduling page URL
        url: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Revisit,
    InPlace,
}

impl From<StrategyArg> for SlotStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Revisit => SlotStrategy::Revisit,
            StrategyArg::InPlace => SlotStrategy::InPlace,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RetentionArg {
    KeepAll,
    NonZeroOnly,
}

impl From<RetentionArg> for RetentionPolicy {
    fn from(arg: RetentionArg) -> Self {
        match arg {
            RetentionArg::KeepAll => RetentionPolicy::KeepAll,
            RetentionArg::NonZeroOnly => RetentionPolicy::NonZeroOnly,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let mut scan = match &cli.config {
        Some(path) => ScanConfig::load_or_default(path)?,
        None => ScanConfig::default(),
    };
    if let Some(strategy) = cli.strategy {
        scan.strategy = strategy.into();
    }
    if let Some(retention) = cli.retention {
        scan.retention = retention.into();
    }

    match cli.command {
        Commands::Serve { port, allowed_host } => {
            let provider = ChromeProvider::new(BrowserConfig::default());
            slotscan_server::serve(provider, scan, ServerConfig { port, allowed_host }).await
        }
        Commands::Check { url } => {
            let provider = ChromeProvider::new(BrowserConfig::default());
            let report =
                tokio::task::spawn_blocking(move || checker::run_check(&provider, &url, &scan))
                    .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
