//! queuestat - Queueing-simulation output analysis
//!
//! Reads an OMNeT++ scavetool export and a TOML configuration, runs the
//! requested analysis and writes JSON series or CSV tables to the export
//! directory.

mod commands;
mod table;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "queuestat")]
#[command(author, version, about = "Statistics and dimensioning for queueing-simulation output")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true, default_value = "queuestat.toml")]
    pub config: PathBuf,

    /// Override the configured scavetool export
    #[arg(long, global = true)]
    pub input: Option<PathBuf>,

    /// Override the configured export directory
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Waiting- and response-time statistics per cashier level
    Response {
        #[arg(long, value_enum, default_value = "all")]
        metric: ResponseMetric,

        /// Build the ECDF from pooled observations instead of cross-repetition means
        #[arg(long)]
        no_ci: bool,
    },

    /// Queue-occupancy statistics per cashier and customer level
    Occupancy {
        #[arg(long, value_enum, default_value = "all")]
        metric: OccupancyMetric,
    },

    /// Seating-node loss probabilities
    Dimension {
        /// Also evaluate the seat and queue sweeps
        #[arg(long)]
        sweeps: bool,

        /// Use double precision instead of exact rationals
        #[arg(long)]
        float: bool,
    },

    /// Mean throughput curve for choosing the warm-up period
    Warmup {
        /// Throughput vector statistic
        #[arg(long, default_value = "throughput")]
        statistic: String,
    },

    /// Running variance of one scenario, to check for finite variance
    Variance {
        #[arg(long)]
        statistic: String,

        #[arg(long)]
        cashier: String,
    },

    /// Print the default configuration
    InitConfig,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseMetric {
    Ecdf,
    Lorenz,
    Histogram,
    Mean,
    Median,
    Cov,
    Qq,
    All,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OccupancyMetric {
    Mean,
    Iod,
    Quantile,
    Histogram,
    Qq,
    All,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "queuestat=debug" } else { "queuestat=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match commands::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
