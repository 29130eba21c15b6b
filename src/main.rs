//! # Main — CLI Entry Point
//!
//! Routes subcommands to the search kernel and its collaborators.
//!
//! ## Subcommands
//!
//! - `search`: find integer roots of a preset or custom polynomial.
//! - `presets`: list the built-in polynomials.
//! - `announce`: run labeled periodic announcers for a fixed duration.
//! - `compare`: time sequential against parallel evaluation of a polynomial.
//!
//! ## Global Options
//!
//! - `--config` / `ROOTQUORUM_CONFIG`: TOML file with `[search]` defaults and
//!   `[[announcer]]` entries.
//! - `LOG_FORMAT=json` switches log output to JSON; `RUST_LOG` sets the filter.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "rootquorum",
    about = "Concurrent search for integer roots of polynomials"
)]
struct Cli {
    /// TOML configuration file (or set ROOTQUORUM_CONFIG env var)
    #[arg(long, env = "ROOTQUORUM_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for integer roots. Without --deadline-secs this never returns
    /// when the polynomial has fewer integer roots than the target.
    Search {
        /// Built-in polynomial: p1|p2|p3|p4 (default p1)
        #[arg(long, conflicts_with = "coeffs")]
        preset: Option<String>,
        /// Custom coefficients, highest degree first, e.g. 1,-6,11,-6
        #[arg(long, allow_hyphen_values = true)]
        coeffs: Option<String>,
        /// Number of roots to collect (default: polynomial degree)
        #[arg(long)]
        target: Option<usize>,
        /// Number of concurrent workers (default 4)
        #[arg(long, env = "ROOTQUORUM_WORKERS")]
        workers: Option<usize>,
        /// Log the first candidates of each worker
        #[arg(long)]
        trace: bool,
        /// Cancel the search after this many seconds and report partial results
        #[arg(long)]
        deadline_secs: Option<f64>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Progress report interval in seconds (0 disables)
        #[arg(long, default_value_t = 30)]
        progress_secs: u64,
    },
    /// List the built-in polynomials
    Presets,
    /// Run labeled periodic announcers, e.g. --label ROJO:3 --label AZUL:5
    Announce {
        /// LABEL:SECS pairs (default ROJO:3 and AZUL:5)
        #[arg(long = "label")]
        labels: Vec<String>,
        /// How long to run before stopping all announcers, in seconds
        #[arg(long, default_value_t = 10.0)]
        duration: f64,
    },
    /// Compare sequential and parallel evaluation over ±1..=count
    Compare {
        /// Built-in polynomial: p1|p2|p3|p4 (default p1)
        #[arg(long, conflicts_with = "coeffs")]
        preset: Option<String>,
        /// Custom coefficients, highest degree first
        #[arg(long, allow_hyphen_values = true)]
        coeffs: Option<String>,
        /// Largest magnitude to evaluate
        #[arg(long, default_value_t = 10_000)]
        count: u64,
        /// Parallel worker threads
        #[arg(long, default_value_t = 8)]
        workers: usize,
    },
}

fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();

    // LOG_FORMAT=json for machine consumption, human-readable otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Search {
            preset,
            coeffs,
            target,
            workers,
            trace,
            deadline_secs,
            json,
            progress_secs,
        } => cli::run_search(
            &config,
            &cli::SearchArgs {
                preset: preset.as_deref(),
                coeffs: coeffs.as_deref(),
                target: *target,
                workers: *workers,
                trace: *trace,
                deadline_secs: *deadline_secs,
                json: *json,
                progress_secs: *progress_secs,
            },
        ),
        Commands::Presets => cli::run_presets(),
        Commands::Announce { labels, duration } => cli::run_announce(&config, labels, *duration),
        Commands::Compare {
            preset,
            coeffs,
            count,
            workers,
        } => cli::run_compare(preset.as_deref(), coeffs.as_deref(), *count, *workers),
    }
}
