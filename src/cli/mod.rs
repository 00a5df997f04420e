//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "desksim")]
#[command(author, version, about = "Simulated trading desk")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scripted trading session
    Simulate(SimulateArgs),
    /// Print an account report
    Report(ReportArgs),
    /// Serve the line-delimited key-value store over stdin/stdout
    StoreServer,
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct SimulateArgs {
    /// Trader account name
    #[arg(short, long, default_value = "alice")]
    pub trader: String,

    /// Symbol to trade
    #[arg(short = 'S', long, default_value = "AAPL")]
    pub symbol: String,

    /// Shares to buy (half are sold back)
    #[arg(short, long, default_value = "10")]
    pub quantity: i64,

    /// Trading rationale recorded on the transactions
    #[arg(long, default_value = "scripted session")]
    pub rationale: String,

    /// Seed today's snapshot with SYMBOL=PRICE pairs for offline runs
    #[arg(long, value_delimiter = ',')]
    pub seed: Vec<String>,
}

#[derive(clap::Args)]
pub struct ReportArgs {
    /// Trader account name
    #[arg(short, long)]
    pub name: String,
}
